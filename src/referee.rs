//! Traits that need to be implemented to feed match results to the engine.
//!
//! The engine never reads input itself: for every game it hands a [`MatchInfo`] to an
//! [`OutcomeSource`] and blocks until an [`Outcome`] comes back. A console prompt, a script or
//! a closure can all play that role.

use std::collections::VecDeque;

use anyhow::bail;

use crate::{
    error::TournamentError,
    outcome::{Color, Outcome},
    player::Player,
};

/// What a referee is told about the game it has to settle.
#[derive(Debug, Clone, Copy)]
pub struct MatchInfo<'a> {
    /// Round number, 1-based.
    pub round: usize,
    /// Game number within the round, 1-based.
    pub number: usize,
    /// Games in the round.
    pub total: usize,
    /// Player 1.
    pub first: &'a Player,
    /// Player 2.
    pub second: &'a Player,
    /// Board sides of (player 1, player 2).
    pub colors: (Color, Color),
}

/// Supplies the result of each game.
///
/// Implementations only return valid outcomes; re-asking on bad input is their job. An
/// error aborts the round in progress and leaves the tournament as it was before the round.
pub trait OutcomeSource {
    /// Result of the game described by `game`.
    fn outcome(&mut self, game: &MatchInfo<'_>) -> anyhow::Result<Outcome>;
}

impl<F> OutcomeSource for F
where
    F: FnMut(&MatchInfo<'_>) -> anyhow::Result<Outcome>,
{
    fn outcome(&mut self, game: &MatchInfo<'_>) -> anyhow::Result<Outcome> {
        self(game)
    }
}

/// Outcomes fixed in advance, consumed in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOutcomes {
    outcomes: VecDeque<Outcome>,
}

impl ScriptedOutcomes {
    /// Plays `outcomes` in order.
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
        }
    }

    /// Builds the script from raw codes (`0`, `1`, `2`).
    pub fn from_codes(codes: &[u8]) -> Result<Self, TournamentError> {
        let outcomes = codes
            .iter()
            .map(|&code| Outcome::try_from(code))
            .collect::<Result<VecDeque<_>, _>>()?;
        Ok(Self { outcomes })
    }

    /// Outcomes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

impl OutcomeSource for ScriptedOutcomes {
    fn outcome(&mut self, game: &MatchInfo<'_>) -> anyhow::Result<Outcome> {
        match self.outcomes.pop_front() {
            Some(outcome) => Ok(outcome),
            None => bail!(
                "no scripted outcome left for round {} game {} ({} vs {})",
                game.round,
                game.number,
                game.first.chess_id,
                game.second.chess_id
            ),
        }
    }
}

#[cfg(test)]
mod referee_tests {
    use super::*;

    fn players() -> (Player, Player) {
        (
            Player::new("AA00001".parse().unwrap(), "Anna", "A", "1990-01-01"),
            Player::new("BB00002".parse().unwrap(), "Boris", "B", "1990-01-01"),
        )
    }

    fn ask<S: OutcomeSource + ?Sized>(
        source: &mut S,
        first: &Player,
        second: &Player,
    ) -> anyhow::Result<Outcome> {
        let info = MatchInfo {
            round: 1,
            number: 1,
            total: 1,
            first,
            second,
            colors: (Color::White, Color::Black),
        };
        source.outcome(&info)
    }

    #[test]
    fn scripted_outcomes_run_out() {
        let (a, b) = players();
        let mut source = ScriptedOutcomes::from_codes(&[1, 0]).unwrap();
        assert_eq!(ask(&mut source, &a, &b).unwrap(), Outcome::FirstWins);
        assert_eq!(ask(&mut source, &a, &b).unwrap(), Outcome::Draw);
        let err = ask(&mut source, &a, &b).unwrap_err();
        assert!(err.to_string().contains("AA00001 vs BB00002"));
    }

    #[test]
    fn scripted_codes_are_validated() {
        assert_eq!(
            ScriptedOutcomes::from_codes(&[0, 3]).unwrap_err(),
            TournamentError::InvalidOutcome("3".into())
        );
    }

    #[test]
    fn closures_are_sources() {
        let (a, b) = players();
        let mut calls = 0;
        let mut source = |game: &MatchInfo<'_>| -> anyhow::Result<Outcome> {
            calls += 1;
            assert_ne!(game.colors.0, game.colors.1);
            Ok(Outcome::SecondWins)
        };
        assert_eq!(ask(&mut source, &a, &b).unwrap(), Outcome::SecondWins);
        assert_eq!(calls, 1);
    }

    #[test]
    fn sources_work_as_trait_objects() {
        let (a, b) = players();
        let mut scripted = ScriptedOutcomes::new([Outcome::Draw]);
        let source: &mut dyn OutcomeSource = &mut scripted;
        assert_eq!(ask(source, &a, &b).unwrap(), Outcome::Draw);
    }
}
