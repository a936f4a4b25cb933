//! # Swiss Tournament
//!
//! A Swiss-system chess tournament engine: it decides who faces whom each round, records match
//! outcomes, accumulates scores and names the winners once every round was played.
//!
//! It provides:
//! - Round-by-round orchestration (`Director`, `Tournament`)
//! - Swiss pairing: random first round, then score ranking with no repeated pairing
//! - Scoring of match outcomes: a win is worth 1 point, a draw half a point to each player
//! - A JSON record layer and store mirroring the persisted tournament documents
//!
//! Match results come from an [`OutcomeSource`](crate::referee::OutcomeSource): a console
//! prompt, a script or a plain closure. The engine is synchronous and asks for outcomes one
//! game at a time, in pairing order.
//!
//! # Documentation Overview
//!
//! - For running tournaments end to end, see the [`director`] module.
//! - For configuring round count, randomness and what happens to players left without a new
//! opponent, see [`Configuration`](crate::configuration::Configuration).
//! - For the pairing rules, see the [`pairing`] module.
//! - For feeding results to the engine, check out the [`OutcomeSource`](crate::referee::OutcomeSource)
//! trait.
//! - For loading and saving tournaments, see [`record`] and [`store`].
//!
//! # Usage Example
//!
//! ```no_run
//! use swiss_tournament::prelude::*;
//! use time::macros::date;
//!
//! fn main() -> anyhow::Result<()> {
//!     // Four rounds, reproducible pairings
//!     let config = Configuration::new().with_round_count(4).with_seed(42);
//!     let mut director = Director::new(config)?;
//!
//!     let players = ["AB12345", "CD23456", "EF34567", "GH45678"]
//!         .iter()
//!         .map(|id| Ok(Player::new(id.parse()?, "First", "Last", "1990-01-01")))
//!         .collect::<anyhow::Result<Vec<_>>>()?;
//!     let details = TournamentDetails {
//!         name: "Spring Open".into(),
//!         location: "Lyon".into(),
//!         start_date: date!(2025 - 04 - 01),
//!         end_date: date!(2025 - 04 - 02),
//!         description: String::new(),
//!     };
//!     let mut tournament = director.create_tournament(details, players)?;
//!
//!     // Player 1 always wins
//!     let mut referee = |_: &MatchInfo<'_>| -> anyhow::Result<Outcome> { Ok(Outcome::FirstWins) };
//!     if let Some(standings) = director.run(&mut tournament, &mut referee)? {
//!         for winner in &standings.winners {
//!             println!("{winner}: {}", standings.score);
//!         }
//!     }
//!
//!     // Keep it for later
//!     let mut store = JsonStore::new("data");
//!     store.save_tournament(&TournamentRecord::from_tournament(&tournament)?)?;
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]

pub use anyhow;
pub mod configuration;
pub mod director;
pub mod error;
pub mod history;
mod logger;
pub mod outcome;
pub mod pairing;
pub mod player;
pub mod record;
pub mod referee;
pub mod report;
pub mod round;
pub mod store;
pub mod tournament;
pub mod validators;

/// Commonly used types and traits for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use swiss_tournament::prelude::*;
/// ```
///
/// Includes:
/// - [`Configuration`](crate::configuration::Configuration) and
/// [`ResiduePolicy`](crate::configuration::ResiduePolicy)
/// - [`Director`](crate::director::Director)
/// - the tournament, player and outcome types
/// - the [`OutcomeSource`](crate::referee::OutcomeSource) and
/// [`TournamentStore`](crate::store::TournamentStore) traits
pub mod prelude {
    pub use crate::configuration::{Configuration, ResiduePolicy};
    pub use crate::director::Director;
    pub use crate::error::TournamentError;
    pub use crate::outcome::{Color, Outcome};
    pub use crate::player::{Player, PlayerId, Roster};
    pub use crate::record::TournamentRecord;
    pub use crate::referee::{MatchInfo, OutcomeSource, ScriptedOutcomes};
    pub use crate::round::{Match, Round};
    pub use crate::store::{JsonStore, TournamentStore};
    pub use crate::tournament::{Standings, Tournament, TournamentDetails, TournamentState};
}
