//! Match outcomes and the resolver that turns them into points.

use std::{fmt, str::FromStr};

use rand::Rng;
use tracing::debug;

use crate::{error::TournamentError, player::Roster, round::Match};

/// Points for a drawn game, per player.
pub const DRAW_POINTS: f64 = 0.5;
/// Points for a won game.
pub const WIN_POINTS: f64 = 1.0;
/// Points for a lost game.
pub const LOSS_POINTS: f64 = 0.0;
/// Points for a bye, scored as a win.
pub const BYE_POINTS: f64 = WIN_POINTS;

/// Result of a single game, from the point of view of its first slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Code `0`.
    Draw,
    /// Code `1`.
    FirstWins,
    /// Code `2`.
    SecondWins,
}

impl Outcome {
    /// Every outcome, ordered by code.
    pub const ALL: [Outcome; 3] = [Outcome::Draw, Outcome::FirstWins, Outcome::SecondWins];

    /// The numeric code entered by the referee.
    pub fn code(self) -> u8 {
        match self {
            Outcome::Draw => 0,
            Outcome::FirstWins => 1,
            Outcome::SecondWins => 2,
        }
    }

    /// Points earned by (first, second). Always sums to one point.
    pub fn points(self) -> (f64, f64) {
        match self {
            Outcome::Draw => (DRAW_POINTS, DRAW_POINTS),
            Outcome::FirstWins => (WIN_POINTS, LOSS_POINTS),
            Outcome::SecondWins => (LOSS_POINTS, WIN_POINTS),
        }
    }
}

impl TryFrom<u8> for Outcome {
    type Error = TournamentError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Outcome::Draw),
            1 => Ok(Outcome::FirstWins),
            2 => Ok(Outcome::SecondWins),
            other => Err(TournamentError::InvalidOutcome(other.to_string())),
        }
    }
}

impl FromStr for Outcome {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.parse::<u8>()
            .map_err(|_| TournamentError::InvalidOutcome(s.to_owned()))
            .and_then(Outcome::try_from)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Draw => "draw",
            Outcome::FirstWins => "player 1 wins",
            Outcome::SecondWins => "player 2 wins",
        };
        f.write_str(label)
    }
}

/// Board side. Purely cosmetic, it never affects scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Moves first.
    White,
    /// Moves second.
    Black,
}

impl Color {
    /// Draws the (first, second) colors of a game at random.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> (Color, Color) {
        if rng.gen_bool(0.5) {
            (Color::White, Color::Black)
        } else {
            (Color::Black, Color::White)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

/// Records `outcome` into `game` and credits both players in `roster`.
///
/// Both players are checked before anything is written, so either the match and both scores
/// are updated or nothing is. Returns the (first, second) points.
pub fn resolve(
    roster: &mut Roster,
    game: &mut Match,
    outcome: Outcome,
) -> Result<(f64, f64), TournamentError> {
    let (first, second) = game.players();
    let (first, second) = (first.clone(), second.clone());
    for id in [&first, &second] {
        if !roster.contains(id) {
            return Err(TournamentError::UnknownPlayer(id.clone()));
        }
    }

    let points = game.record(outcome)?;
    roster.award(&first, points.0)?;
    roster.award(&second, points.1)?;
    debug!(%first, %second, %outcome, "match resolved");
    Ok(points)
}
