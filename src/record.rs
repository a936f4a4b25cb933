//! Persisted shape of tournaments.
//!
//! Records mirror the stored JSON documents field for field:
//!
//! ```json
//! {
//!   "name": "Spring Open", "location": "Lyon",
//!   "startDate": "2025-04-01", "endDate": "2025-04-02", "roundNumber": 4,
//!   "roundList": [{
//!     "number": 1, "name": "Round 1",
//!     "matchList": [{ "match": [[{ "chess_id": "AB12345", ... }, 1.0],
//!                               [{ "chess_id": "CD67890", ... }, 0.0]] }],
//!     "startDate": "2025-04-01 10:00:00", "endDate": "2025-04-01 10:30:00"
//!   }],
//!   "playerList": [{ "last_name": "...", "first_name": "...", "birth_date": "...",
//!                    "chess_id": "AB12345", "point": 1.0 }],
//!   "description": ""
//! }
//! ```
//!
//! Players inside matches are full player objects carrying their score at save time.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::TournamentError,
    history::MatchHistory,
    player::{Player, PlayerId, Roster},
    round::{format_timestamp, parse_timestamp, Match, Round},
    tournament::{Tournament, TournamentDetails},
    validators::{format_date, parse_date},
};

/// A stored tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRecord {
    /// Tournament name.
    pub name: String,
    /// Venue.
    pub location: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// `YYYY-MM-DD`.
    pub end_date: String,
    /// Configured number of rounds.
    #[serde(default = "default_round_number")]
    pub round_number: usize,
    /// Completed rounds.
    #[serde(default)]
    pub round_list: Vec<RoundRecord>,
    /// Players with their scores at save time.
    pub player_list: Vec<Player>,
    /// Free text.
    #[serde(default)]
    pub description: String,
}

fn default_round_number() -> usize {
    crate::configuration::DEFAULT_ROUND_COUNT
}

/// A stored round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    /// 1-based.
    pub number: usize,
    /// `Round N`.
    pub name: String,
    /// Games in pairing order.
    #[serde(default)]
    pub match_list: Vec<MatchRecord>,
    /// `YYYY-MM-DD HH:MM:SS`.
    pub start_date: String,
    /// `YYYY-MM-DD HH:MM:SS`. Rounds without one never finished and are refused on load.
    pub end_date: Option<String>,
    /// Players awarded a bye.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bye_list: Vec<PlayerId>,
}

/// A stored game: `[[player, score], [player, score]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// (player, score) of player 1 and player 2.
    #[serde(rename = "match")]
    pub slots: [(Player, f64); 2],
}

impl TournamentRecord {
    /// Snapshot of `tournament`, ready to be stored.
    pub fn from_tournament(tournament: &Tournament) -> anyhow::Result<TournamentRecord> {
        let details = tournament.details();
        let roster = tournament.players();
        let round_list = tournament
            .rounds()
            .iter()
            .map(|round| RoundRecord::from_round(round, roster))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(TournamentRecord {
            name: details.name.clone(),
            location: details.location.clone(),
            start_date: format_date(details.start_date)?,
            end_date: format_date(details.end_date)?,
            round_number: tournament.round_count(),
            round_list,
            player_list: roster.iter().cloned().collect(),
            description: details.description.clone(),
        })
    }
}

impl RoundRecord {
    fn from_round(round: &Round, roster: &Roster) -> anyhow::Result<RoundRecord> {
        let match_list = round
            .matches()
            .iter()
            .map(|game| MatchRecord::from_match(game, roster))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(RoundRecord {
            number: round.number(),
            name: round.name().to_owned(),
            match_list,
            start_date: format_timestamp(round.started_at())?,
            end_date: round.ended_at().map(format_timestamp).transpose()?,
            bye_list: round.byes().to_vec(),
        })
    }

    fn into_round(self, roster: &Roster) -> anyhow::Result<Round> {
        let matches = self
            .match_list
            .into_iter()
            .map(|game| game.into_match(roster))
            .collect::<Result<Vec<_>, _>>()?;
        for id in &self.bye_list {
            roster.require(id)?;
        }
        let started_at = parse_timestamp(&self.start_date)
            .with_context(|| format!("bad start date of {}", self.name))?;
        let end_date = self
            .end_date
            .ok_or(TournamentError::UnfinishedRound(self.number))?;
        let ended_at = parse_timestamp(&end_date)
            .with_context(|| format!("bad end date of {}", self.name))?;

        Ok(Round::restored(self.number, self.name, matches, self.bye_list)
            .with_timestamps(started_at, ended_at))
    }
}

impl MatchRecord {
    fn from_match(game: &Match, roster: &Roster) -> anyhow::Result<MatchRecord> {
        let (first, second) = game.players();
        let (a, b) = game
            .scores()
            .with_context(|| format!("match {game} has no result"))?;
        Ok(MatchRecord {
            slots: [
                (roster.require(first)?.clone(), a),
                (roster.require(second)?.clone(), b),
            ],
        })
    }

    fn into_match(self, roster: &Roster) -> Result<Match, TournamentError> {
        let [(first, a), (second, b)] = self.slots;
        roster.require(&first.chess_id)?;
        roster.require(&second.chess_id)?;
        Ok(Match::resolved((first.chess_id, a), (second.chess_id, b)))
    }
}

impl TryFrom<TournamentRecord> for Tournament {
    type Error = anyhow::Error;

    fn try_from(record: TournamentRecord) -> anyhow::Result<Tournament> {
        if record.round_number == 0 {
            return Err(TournamentError::NoRounds.into());
        }
        let details = TournamentDetails {
            start_date: parse_date(&record.start_date)?,
            end_date: parse_date(&record.end_date)?,
            name: record.name,
            location: record.location,
            description: record.description,
        };
        if let Some(player) = record
            .player_list
            .iter()
            .find(|p| !p.point.is_finite() || p.point < 0.0)
        {
            return Err(TournamentError::InvalidScore {
                player: player.chess_id.clone(),
                point: player.point,
            }
            .into());
        }
        let roster = Roster::new(record.player_list)?;
        let rounds = record
            .round_list
            .into_iter()
            .map(|round| round.into_round(&roster))
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(|| format!("could not load rounds of {}", details.name))?;
        if rounds.len() > record.round_number {
            warn!(
                tournament = %details.name,
                played = rounds.len(),
                configured = record.round_number,
                "more rounds stored than configured"
            );
        }
        let history = MatchHistory::from_rounds(&rounds);
        for player in roster.iter() {
            let played = history.score(&player.chess_id);
            if player.point != played {
                warn!(
                    tournament = %details.name,
                    player = %player.chess_id,
                    stored = player.point,
                    played,
                    "stored score differs from the match history"
                );
            }
        }

        Ok(Tournament::restore(
            details,
            record.round_number,
            rounds,
            roster,
        ))
    }
}
