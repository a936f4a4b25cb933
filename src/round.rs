//! Rounds, their matches, and the orchestration of a single round.

use std::fmt;

use rand::Rng;
use time::{macros::format_description, OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    configuration::ResiduePolicy,
    error::TournamentError,
    history::MatchHistory,
    outcome::{resolve, Color, Outcome, BYE_POINTS},
    pairing::pair,
    player::{PlayerId, Roster},
    referee::{MatchInfo, OutcomeSource},
};

/// One game: two (player, score) slots. Slot order only matters for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    slots: [(PlayerId, Option<f64>); 2],
}

impl Match {
    /// A game with no result yet.
    pub fn new(first: PlayerId, second: PlayerId) -> Match {
        Match {
            slots: [(first, None), (second, None)],
        }
    }

    pub(crate) fn resolved(first: (PlayerId, f64), second: (PlayerId, f64)) -> Match {
        Match {
            slots: [(first.0, Some(first.1)), (second.0, Some(second.1))],
        }
    }

    /// (player 1, player 2).
    pub fn players(&self) -> (&PlayerId, &PlayerId) {
        (&self.slots[0].0, &self.slots[1].0)
    }

    /// Points earned by (player 1, player 2), once resolved.
    pub fn scores(&self) -> Option<(f64, f64)> {
        match (self.slots[0].1, self.slots[1].1) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    /// True once a result was recorded.
    pub fn is_resolved(&self) -> bool {
        self.scores().is_some()
    }

    /// True when this game opposes `a` and `b`, in either slot order.
    pub fn involves(&self, a: &PlayerId, b: &PlayerId) -> bool {
        let (first, second) = self.players();
        (first == a && second == b) || (first == b && second == a)
    }

    pub(crate) fn record(&mut self, outcome: Outcome) -> Result<(f64, f64), TournamentError> {
        if self.is_resolved() {
            let (first, second) = self.players();
            return Err(TournamentError::AlreadyResolved {
                first: first.clone(),
                second: second.clone(),
            });
        }
        let (a, b) = outcome.points();
        self.slots[0].1 = Some(a);
        self.slots[1].1 = Some(b);
        Ok((a, b))
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (first, second) = self.players();
        match self.scores() {
            Some((a, b)) => write!(f, "{first} {a} - {b} {second}"),
            None => write!(f, "{first} vs {second}"),
        }
    }
}

/// Where a round stands. A round only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RoundPhase {
    /// Start time stamped, no pairing yet.
    Created,
    /// Pairing decided, no result yet.
    Paired,
    /// Results are being collected.
    InProgress,
    /// Every match has a result and the end time is stamped.
    Complete,
}

/// A tournament round.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    number: usize,
    name: String,
    matches: Vec<Match>,
    byes: Vec<PlayerId>,
    unpaired: Vec<PlayerId>,
    started_at: PrimitiveDateTime,
    ended_at: Option<PrimitiveDateTime>,
    phase: RoundPhase,
}

impl Round {
    /// Creates round `number` (1-based) and stamps its start time.
    pub fn new(number: usize) -> Round {
        Round {
            number,
            name: format!("Round {number}"),
            matches: vec![],
            byes: vec![],
            unpaired: vec![],
            started_at: now(),
            ended_at: None,
            phase: RoundPhase::Created,
        }
    }

    /// A round that was already played, e.g. loaded back from storage.
    pub(crate) fn restored(
        number: usize,
        name: String,
        matches: Vec<Match>,
        byes: Vec<PlayerId>,
    ) -> Round {
        let at = now();
        Round {
            number,
            name,
            matches,
            byes,
            unpaired: vec![],
            started_at: at,
            ended_at: Some(at),
            phase: RoundPhase::Complete,
        }
    }

    pub(crate) fn with_timestamps(
        mut self,
        started_at: PrimitiveDateTime,
        ended_at: PrimitiveDateTime,
    ) -> Round {
        self.started_at = started_at;
        self.ended_at = Some(ended_at);
        self
    }

    /// 1-based round number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Display name, `"Round N"` unless loaded otherwise.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Games in pairing order.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Players awarded a bye this round.
    pub fn byes(&self) -> &[PlayerId] {
        &self.byes
    }

    /// Players who sat this round out because no new opponent was left for them.
    pub fn unpaired(&self) -> &[PlayerId] {
        &self.unpaired
    }

    /// Stamped when the round was created.
    pub fn started_at(&self) -> PrimitiveDateTime {
        self.started_at
    }

    /// Set once every match concluded.
    pub fn ended_at(&self) -> Option<PrimitiveDateTime> {
        self.ended_at
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// The end timestamp is the completion marker.
    pub fn is_complete(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Moves to `phase`; a later phase is never undone.
    fn enter(&mut self, phase: RoundPhase) {
        if phase > self.phase {
            trace!(round = self.number, ?phase);
            self.phase = phase;
        }
    }

    fn finish(&mut self) {
        self.ended_at = Some(now());
        self.enter(RoundPhase::Complete);
    }
}

/// Round settings handed down by the tournament.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RoundSettings {
    pub number: usize,
    pub round_count: usize,
    pub residue: ResiduePolicy,
}

/// Plays one round against `roster`: pairs the players, applies the residue policy, asks
/// `source` for every outcome in pairing order and records the results.
///
/// `previous` holds every completed round; it feeds the pairing engine only.
#[instrument(skip_all, fields(round = settings.number))]
pub(crate) fn play_round<R, S>(
    settings: RoundSettings,
    roster: &mut Roster,
    previous: &[Round],
    rng: &mut R,
    source: &mut S,
) -> anyhow::Result<Round>
where
    R: Rng + ?Sized,
    S: OutcomeSource + ?Sized,
{
    let mut round = Round::new(settings.number);
    let history = MatchHistory::from_rounds(previous);

    // 1. pairing
    let pairing = pair(&roster.ids(), settings.number, &history, rng);
    trace!(?pairing);
    if !pairing.unpaired.is_empty() {
        match settings.residue {
            ResiduePolicy::Skip => {
                warn!(
                    players = ?pairing.unpaired,
                    "no new opponent left, players sit this round out"
                );
                round.unpaired = pairing.unpaired.clone();
            }
            ResiduePolicy::Bye => {
                for id in &pairing.unpaired {
                    if history.byes(id) > 0 {
                        warn!(
                            "{id} already received a bye, assigning another one due to no valid opponents"
                        );
                    } else {
                        info!("{id} receives a bye");
                    }
                    roster.award(id, BYE_POINTS)?;
                }
                round.byes = pairing.unpaired.clone();
            }
            ResiduePolicy::Fail => {
                return Err(TournamentError::UnpairablePlayers {
                    round: settings.number,
                    players: pairing.unpaired,
                }
                .into());
            }
        }
    }
    round.enter(RoundPhase::Paired);

    // 2. matches, strictly in pairing order
    let total = pairing.pairs.len();
    for (index, (first, second)) in pairing.pairs.into_iter().enumerate() {
        round.enter(RoundPhase::InProgress);
        let colors = Color::draw(rng);
        let outcome = {
            let info = MatchInfo {
                round: settings.number,
                number: index + 1,
                total,
                first: roster.require(&first)?,
                second: roster.require(&second)?,
                colors,
            };
            source.outcome(&info)?
        };
        let mut game = Match::new(first, second);
        resolve(roster, &mut game, outcome)?;
        debug!(%game);
        round.matches.push(game);
    }

    // 3. done
    round.finish();
    info!(
        matches = round.matches.len(),
        is_last = settings.number == settings.round_count,
        "round complete"
    );
    Ok(round)
}

/// Wall-clock time, local when the offset is known, UTC otherwise.
fn now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

/// `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn format_timestamp(at: PrimitiveDateTime) -> anyhow::Result<String> {
    Ok(at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))?)
}

pub(crate) fn parse_timestamp(s: &str) -> anyhow::Result<PrimitiveDateTime> {
    Ok(PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )?)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{player::Player, referee::ScriptedOutcomes};

    fn id(s: &str) -> PlayerId {
        s.parse().unwrap()
    }

    fn roster(ids: &[&str]) -> Roster {
        Roster::new(
            ids.iter()
                .map(|s| Player::new(id(s), "First", "Last", "1990-01-01"))
                .collect(),
        )
        .unwrap()
    }

    fn settings(number: usize, residue: ResiduePolicy) -> RoundSettings {
        RoundSettings {
            number,
            round_count: 4,
            residue,
        }
    }

    #[test]
    fn new_round_is_stamped_but_not_complete() {
        let round = Round::new(3);
        assert_eq!(round.number(), 3);
        assert_eq!(round.name(), "Round 3");
        assert_eq!(round.phase(), RoundPhase::Created);
        assert!(!round.is_complete());
        assert!(round.matches().is_empty());
    }

    #[test]
    fn phases_only_move_forward() {
        let mut round = Round::new(1);
        round.enter(RoundPhase::Paired);
        assert_eq!(round.phase(), RoundPhase::Paired);
        round.enter(RoundPhase::Created);
        assert_eq!(round.phase(), RoundPhase::Paired);
        round.enter(RoundPhase::InProgress);
        assert_eq!(round.phase(), RoundPhase::InProgress);
        round.finish();
        round.enter(RoundPhase::Paired);
        assert_eq!(round.phase(), RoundPhase::Complete);
    }

    #[test]
    fn first_round_plays_every_player_once() {
        let mut roster = roster(&["AA00001", "BB00002", "CC00003", "DD00004"]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut source = ScriptedOutcomes::new([Outcome::FirstWins, Outcome::Draw]);

        let round = play_round(
            settings(1, ResiduePolicy::Skip),
            &mut roster,
            &[],
            &mut rng,
            &mut source,
        )
        .unwrap();

        assert!(round.is_complete());
        assert_eq!(round.phase(), RoundPhase::Complete);
        assert!(round.ended_at().unwrap() >= round.started_at());
        assert_eq!(round.matches().len(), 2);
        assert!(round.matches().iter().all(Match::is_resolved));
        assert_eq!(source.remaining(), 0);

        let total: f64 = roster.iter().map(|p| p.point).sum();
        assert_eq!(total, 2.0);
        let (first, _) = round.matches()[0].players();
        assert_eq!(roster.require(first).unwrap().point, 1.0);
    }

    #[test]
    fn outcomes_are_requested_in_pairing_order() {
        let mut roster = roster(&["AA00001", "BB00002", "CC00003", "DD00004", "EE00005", "FF00006"]);
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = vec![];
        let mut source = |info: &MatchInfo<'_>| -> anyhow::Result<Outcome> {
            seen.push((info.number, info.total, info.first.chess_id.clone()));
            Ok(Outcome::Draw)
        };

        let round = play_round(
            settings(1, ResiduePolicy::Skip),
            &mut roster,
            &[],
            &mut rng,
            &mut source,
        )
        .unwrap();

        assert_eq!(seen.len(), 3);
        for (index, (number, total, first)) in seen.iter().enumerate() {
            assert_eq!(*number, index + 1);
            assert_eq!(*total, 3);
            assert_eq!(round.matches()[index].players().0, first);
        }
    }

    fn exhausted_history() -> Vec<Round> {
        // AA and BB met in round 1, two players only: nobody is left for round 2
        let mut game = Match::new(id("AA00001"), id("BB00002"));
        game.record(Outcome::FirstWins).unwrap();
        vec![Round::restored(1, "Round 1".into(), vec![game], vec![])]
    }

    #[test]
    fn skip_policy_records_players_sitting_out() {
        let mut roster = roster(&["AA00001", "BB00002"]);
        let mut rng = StdRng::seed_from_u64(3);
        let round = play_round(
            settings(2, ResiduePolicy::Skip),
            &mut roster,
            &exhausted_history(),
            &mut rng,
            &mut ScriptedOutcomes::default(),
        )
        .unwrap();
        assert!(round.matches().is_empty());
        assert_eq!(round.unpaired().len(), 2);
        assert!(round.byes().is_empty());
        assert!(round.is_complete());
        assert!(roster.iter().all(|p| p.point == 0.0));
    }

    #[test]
    fn bye_policy_awards_a_point() {
        let mut roster = roster(&["AA00001", "BB00002"]);
        let mut rng = StdRng::seed_from_u64(3);
        let round = play_round(
            settings(2, ResiduePolicy::Bye),
            &mut roster,
            &exhausted_history(),
            &mut rng,
            &mut ScriptedOutcomes::default(),
        )
        .unwrap();
        assert_eq!(round.byes().len(), 2);
        assert!(roster.iter().all(|p| p.point == BYE_POINTS));
    }

    #[test]
    fn fail_policy_refuses_the_round() {
        let mut roster = roster(&["AA00001", "BB00002"]);
        let mut rng = StdRng::seed_from_u64(3);
        let err = play_round(
            settings(2, ResiduePolicy::Fail),
            &mut roster,
            &exhausted_history(),
            &mut rng,
            &mut ScriptedOutcomes::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TournamentError>(),
            Some(TournamentError::UnpairablePlayers { round: 2, players }) if players.len() == 2
        ));
    }

    #[test]
    fn timestamps_use_the_record_format() {
        let at = parse_timestamp("2025-03-01 09:05:07").unwrap();
        assert_eq!(format_timestamp(at).unwrap(), "2025-03-01 09:05:07");
        assert!(parse_timestamp("2025-03-01").is_err());
    }
}
