//! Errors raised by the tournament engine.

use thiserror::Error;

use crate::player::PlayerId;

/// Domain errors of the pairing and scoring engine.
///
/// Orchestration functions return [`anyhow::Result`]; these errors travel inside and can be
/// recovered with [`anyhow::Error::downcast_ref`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TournamentError {
    /// Swiss pairing needs every player to have an opponent in round 1.
    #[error("a tournament needs an even number of players, got {0}")]
    OddPlayerCount(usize),

    /// Fewer than two players were registered.
    #[error("a tournament needs at least two players, got {0}")]
    NotEnoughPlayers(usize),

    /// The same chess id was registered twice.
    #[error("player {0} is registered twice")]
    DuplicatePlayer(PlayerId),

    /// A match or bye refers to a player the roster does not know.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Outcome codes are `0` (draw), `1` (first player wins) or `2` (second player wins).
    #[error("invalid outcome code '{0}': expected 0 (draw), 1 or 2")]
    InvalidOutcome(String),

    /// Chess ids are two letters followed by five digits.
    #[error("invalid chess id '{0}': expected two letters followed by five digits")]
    InvalidPlayerId(String),

    /// The configured round count was zero.
    #[error("a tournament needs at least one round")]
    NoRounds,

    /// A match result is immutable once recorded.
    #[error("match {first} vs {second} already has a result")]
    AlreadyResolved {
        /// Player in the first slot.
        first: PlayerId,
        /// Player in the second slot.
        second: PlayerId,
    },

    /// A stored round has no end date: it never finished.
    #[error("round {0} has no end date, it never finished")]
    UnfinishedRound(usize),

    /// A stored score is negative or not a number.
    #[error("player {player} has an invalid score {point}")]
    InvalidScore {
        /// Player holding the score.
        player: PlayerId,
        /// Stored score.
        point: f64,
    },

    /// Every configured round has already been played.
    #[error("tournament already played its {0} rounds")]
    AlreadyComplete(usize),

    /// Raised by [`ResiduePolicy::Fail`](crate::configuration::ResiduePolicy::Fail) when some
    /// players have no opponent left that they have not already faced.
    #[error("round {round}: no new opponent left for {}", format_ids(.players))]
    UnpairablePlayers {
        /// Round that could not be paired.
        round: usize,
        /// Players left without a valid opponent.
        players: Vec<PlayerId>,
    },
}

fn format_ids(ids: &[PlayerId]) -> String {
    ids.iter()
        .map(PlayerId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
