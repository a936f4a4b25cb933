//! Top-level driver of a tournament.
//!
//! The [`Director`] owns the [`Configuration`] and the random source every pairing draws
//! from. It creates tournaments with the configured round count and residue policy, then
//! plays them round after round against an [`OutcomeSource`].
//!
//! # Behavior & Configuration
//!
//! - When `config.log = true`, every trace goes to a timestamped log file (see
//!   [`Configuration::with_log`]). Only one global subscriber can exist: disable it if your
//!   program already installs one.
//! - When `config.verbose = true`, each finished round and the final winners are printed to
//!   stdout.
//! - With a seed (`config.with_seed`), pairings are reproducible: the same seed and the same
//!   outcomes give the same tournament.
//!
//! # Example
//!
//! See crate-level documentation for an example on how to use the `Director`.

use rand::rngs::StdRng;
use tracing::{info, instrument, trace};

use crate::{
    configuration::Configuration,
    error::TournamentError,
    logger::init_logger,
    player::Player,
    referee::OutcomeSource,
    report::{round_report, standings_report, winners_line},
    tournament::{RoundReport, Standings, Tournament, TournamentDetails},
};

/// Runs tournaments with a given [`Configuration`].
#[derive(Debug)]
pub struct Director {
    config: Configuration,
    rng: StdRng,
}

impl Director {
    /// Create a [`Director`]. Installs the file logger when `config.log` is set.
    ///
    /// # Errors
    /// The log file could not be created, or a global subscriber is already set.
    #[instrument(skip_all)]
    pub fn new(config: Configuration) -> anyhow::Result<Director> {
        if config.log {
            init_logger()?;
        }

        trace!(?config);

        Ok(Director {
            config,
            rng: config.rng(),
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// A new tournament with the configured round count and residue policy.
    pub fn create_tournament(
        &self,
        details: TournamentDetails,
        players: Vec<Player>,
    ) -> Result<Tournament, TournamentError> {
        let tournament = Tournament::new(details, players, &self.config)?;
        info!(
            tournament = %tournament.details().name,
            players = tournament.players().len(),
            rounds = tournament.round_count(),
            "tournament created"
        );
        Ok(tournament)
    }

    /// Plays the next round of `tournament`, printing it when verbose.
    ///
    /// The configured residue policy applies, also to tournaments loaded from a store.
    pub fn play_round<S: OutcomeSource + ?Sized>(
        &mut self,
        tournament: &mut Tournament,
        source: &mut S,
    ) -> anyhow::Result<RoundReport> {
        tournament.set_residue_policy(self.config.residue);
        let report = tournament.play_next_round(&mut self.rng, source)?;
        if self.config.verbose {
            if let Some(round) = tournament.rounds().last() {
                print_round(&round_report(round, tournament.players()));
            }
        }
        Ok(report)
    }

    /// Plays every remaining round of `tournament` with [`Director::play_round`] and returns
    /// the winners.
    ///
    /// # Errors
    /// A round was refused or `source` failed. Completed rounds stay in `tournament`.
    #[instrument(skip_all, fields(tournament = %tournament.details().name))]
    pub fn run<S: OutcomeSource + ?Sized>(
        &mut self,
        tournament: &mut Tournament,
        source: &mut S,
    ) -> anyhow::Result<Option<Standings>> {
        while !tournament.is_complete() {
            self.play_round(tournament, source)?;
        }

        let standings = tournament.winners();
        if self.config.verbose {
            print!("{}", standings_report(tournament));
            match &standings {
                // green
                Some(standings) => println!("\x1b[32m{}\x1b[39m", winners_line(standings)),
                None => println!("No winner"),
            }
        }
        Ok(standings)
    }
}

fn print_round(report: &str) {
    // green header, default body
    let mut lines = report.lines();
    if let Some(header) = lines.next() {
        println!("\x1b[32m{header}\x1b[39m");
    }
    for line in lines {
        println!("{line}");
    }
}
