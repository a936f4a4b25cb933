//! The tournament: its players, its rounds and the sequence that drives them.

use rand::Rng;
use time::Date;
use tracing::{info, instrument, warn};

use crate::{
    configuration::{Configuration, ResiduePolicy},
    error::TournamentError,
    history::MatchHistory,
    player::{Player, Roster},
    referee::OutcomeSource,
    round::{play_round, Round, RoundSettings},
};

/// Who, where and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentDetails {
    /// Tournament name, used to look it up in reports.
    pub name: String,
    /// Venue.
    pub location: String,
    /// First day.
    pub start_date: Date,
    /// Last day.
    pub end_date: Date,
    /// Free text.
    pub description: String,
}

/// Where a tournament stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentState {
    /// No round played yet.
    NotStarted,
    /// Some rounds played, more to go.
    InProgress {
        /// Rounds completed so far.
        completed: usize,
    },
    /// Every configured round was played.
    Complete,
}

/// Returned after each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    /// Number of the round that just finished.
    pub number: usize,
    /// True when it was the tournament's last round.
    pub is_last: bool,
}

/// The players sharing the best score.
#[derive(Debug, Clone, PartialEq)]
pub struct Standings {
    /// Every player with the top score, in registration order.
    pub winners: Vec<Player>,
    /// The top score.
    pub score: f64,
}

impl Standings {
    /// Computes the winners of a finished field. `None` without players.
    pub fn from_players<'a>(players: impl IntoIterator<Item = &'a Player>) -> Option<Standings> {
        let players: Vec<&Player> = players.into_iter().collect();
        let score = players
            .iter()
            .map(|p| p.point)
            .fold(None, |best: Option<f64>, point| {
                Some(best.map_or(point, |best| best.max(point)))
            })?;
        let winners = players
            .into_iter()
            .filter(|p| p.point == score)
            .cloned()
            .collect();
        Some(Standings { winners, score })
    }

    /// True when more than one player shares the top score.
    pub fn is_tie(&self) -> bool {
        self.winners.len() > 1
    }
}

/// A Swiss-system tournament.
///
/// The tournament exclusively owns its players: scores are only changed while a round is
/// played, and a round is committed as a whole. Rounds are append-only and form the match
/// history used for pairing.
#[derive(Debug, Clone)]
pub struct Tournament {
    details: TournamentDetails,
    round_count: usize,
    residue: ResiduePolicy,
    rounds: Vec<Round>,
    roster: Roster,
}

impl Tournament {
    /// Creates a tournament that has not started yet.
    ///
    /// The number of rounds and the residue policy come from `config`. Players' scores are
    /// reset to zero.
    ///
    /// # Errors
    /// Fewer than two players, an odd number of players, a chess id registered twice, or a
    /// round count of zero.
    pub fn new(
        details: TournamentDetails,
        players: Vec<Player>,
        config: &Configuration,
    ) -> Result<Tournament, TournamentError> {
        if players.len() < 2 {
            return Err(TournamentError::NotEnoughPlayers(players.len()));
        }
        if players.len() % 2 != 0 {
            return Err(TournamentError::OddPlayerCount(players.len()));
        }
        if config.round_count == 0 {
            return Err(TournamentError::NoRounds);
        }
        let mut roster = Roster::new(players)?;
        roster.reset_scores();

        if config.round_count >= roster.len() {
            warn!(
                rounds = config.round_count,
                players = roster.len(),
                "more rounds than distinct opponents, some players will run out of opponents"
            );
        }

        Ok(Tournament {
            details,
            round_count: config.round_count,
            residue: config.residue,
            rounds: vec![],
            roster,
        })
    }

    /// Rebuilds a tournament from already validated parts.
    pub(crate) fn restore(
        details: TournamentDetails,
        round_count: usize,
        rounds: Vec<Round>,
        roster: Roster,
    ) -> Tournament {
        Tournament {
            details,
            round_count,
            residue: ResiduePolicy::default(),
            rounds,
            roster,
        }
    }

    /// Changes what happens to players left without a new opponent.
    pub fn set_residue_policy(&mut self, residue: ResiduePolicy) {
        self.residue = residue;
    }

    /// Name, venue, dates and description.
    pub fn details(&self) -> &TournamentDetails {
        &self.details
    }

    /// Number of rounds the tournament lasts.
    pub fn round_count(&self) -> usize {
        self.round_count
    }

    /// Completed rounds, oldest first.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Players with their current scores.
    pub fn players(&self) -> &Roster {
        &self.roster
    }

    /// Scores and pairs folded from every completed round.
    pub fn history(&self) -> MatchHistory {
        MatchHistory::from_rounds(&self.rounds)
    }

    /// Derived from the number of completed rounds.
    pub fn state(&self) -> TournamentState {
        match self.rounds.len() {
            0 => TournamentState::NotStarted,
            n if n >= self.round_count => TournamentState::Complete,
            completed => TournamentState::InProgress { completed },
        }
    }

    /// True once every configured round was played.
    pub fn is_complete(&self) -> bool {
        self.state() == TournamentState::Complete
    }

    /// Plays the next round and appends it to the history.
    ///
    /// The round is played on a copy of the players: if `source` fails, or the residue
    /// policy refuses the round, neither the scores nor the history change.
    ///
    /// # Errors
    /// The tournament is already complete, the round was refused, or `source` failed.
    #[instrument(skip_all, fields(tournament = %self.details.name))]
    pub fn play_next_round<R, S>(
        &mut self,
        rng: &mut R,
        source: &mut S,
    ) -> anyhow::Result<RoundReport>
    where
        R: Rng + ?Sized,
        S: OutcomeSource + ?Sized,
    {
        if self.is_complete() {
            return Err(TournamentError::AlreadyComplete(self.round_count).into());
        }

        let settings = RoundSettings {
            number: self.rounds.len() + 1,
            round_count: self.round_count,
            residue: self.residue,
        };
        let mut roster = self.roster.clone();
        let round = play_round(settings, &mut roster, &self.rounds, rng, source)?;

        self.roster = roster;
        self.rounds.push(round);
        Ok(RoundReport {
            number: settings.number,
            is_last: settings.number == self.round_count,
        })
    }

    /// Plays every remaining round, then computes the winners.
    pub fn run<R, S>(&mut self, rng: &mut R, source: &mut S) -> anyhow::Result<Option<Standings>>
    where
        R: Rng + ?Sized,
        S: OutcomeSource + ?Sized,
    {
        while !self.is_complete() {
            self.play_next_round(rng, source)?;
        }
        Ok(self.winners())
    }

    /// Every player sharing the best score.
    ///
    /// `None`, with a warning, when there is nothing to rank: no player or no round played.
    pub fn winners(&self) -> Option<Standings> {
        if self.roster.is_empty() || self.rounds.is_empty() {
            warn!(
                tournament = %self.details.name,
                "nothing to rank, no winner computed"
            );
            return None;
        }
        let standings = Standings::from_players(self.roster.iter())?;
        let winners: Vec<&str> = standings.winners.iter().map(|p| p.chess_id.as_str()).collect();
        info!(?winners, score = standings.score, "tournament winners");
        Some(standings)
    }

    /// Players by descending score, ties in registration order.
    pub fn standings(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.roster.iter().collect();
        players.sort_by(|a, b| b.point.total_cmp(&a.point));
        players
    }
}
