//! Config for the tournament behaviors
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! All values are optional and case-insensitive. Flags are enabled with `"true"`.
//!
//! - `SWISS_VERBOSE`: Print each finished round to stdout (default: `true`)
//! - `SWISS_LOG`: Enable logging to a file (default: `false`)
//! - `SWISS_ROUNDS`: Number of rounds of a new tournament (default: `4`)
//! - `SWISS_SEED`: Seed of the pairing random source (default: none, seeded from entropy)
//! - `SWISS_RESIDUE`: What to do with players left without opponent: `skip`, `bye` or
//!   `fail` (default: `skip`)

use std::{fmt, str::FromStr};

use anyhow::bail;
use rand::{rngs::StdRng, SeedableRng};

/// Rounds played when nothing else is configured.
pub const DEFAULT_ROUND_COUNT: usize = 4;

/// What a round does with players for whom no new opponent is left.
///
/// Late rounds of a small field can leave players who already faced every remaining free
/// player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResiduePolicy {
    /// They sit the round out, without points. The round lists them in
    /// [`Round::unpaired`](crate::round::Round::unpaired).
    #[default]
    Skip,
    /// They get a bye worth a win.
    Bye,
    /// The round is refused with
    /// [`TournamentError::UnpairablePlayers`](crate::error::TournamentError::UnpairablePlayers).
    Fail,
}

impl FromStr for ResiduePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(ResiduePolicy::Skip),
            "bye" => Ok(ResiduePolicy::Bye),
            "fail" => Ok(ResiduePolicy::Fail),
            other => bail!("unknown residue policy '{other}', expected skip, bye or fail"),
        }
    }
}

impl fmt::Display for ResiduePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResiduePolicy::Skip => f.write_str("skip"),
            ResiduePolicy::Bye => f.write_str("bye"),
            ResiduePolicy::Fail => f.write_str("fail"),
        }
    }
}

/// Configuration for tournament behaviors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    pub(crate) verbose: bool,
    pub(crate) log: bool,
    pub(crate) round_count: usize,
    pub(crate) seed: Option<u64>,
    pub(crate) residue: ResiduePolicy,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Finished rounds are printed to stdout.
    /// - Logging to file is disabled.
    /// - Tournaments last 4 rounds.
    /// - Pairing randomness is seeded from entropy.
    /// - Players without a new opponent sit the round out.
    pub fn new() -> Self {
        Self {
            verbose: true,
            log: false,
            round_count: DEFAULT_ROUND_COUNT,
            seed: None,
            residue: ResiduePolicy::Skip,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// See the [module documentation](self) for the recognized variables. Unset or
    /// unparsable values keep their default.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn get_env_parsed<T: FromStr>(var: &str) -> Option<T> {
            std::env::var(var).ok()?.trim().parse().ok()
        }

        let defaults = Self::new();
        Self {
            verbose: get_env_flag("SWISS_VERBOSE", defaults.verbose),
            log: get_env_flag("SWISS_LOG", defaults.log),
            round_count: get_env_parsed("SWISS_ROUNDS")
                .filter(|&n| n > 0)
                .unwrap_or(defaults.round_count),
            seed: get_env_parsed("SWISS_SEED"),
            residue: get_env_parsed("SWISS_RESIDUE").unwrap_or(defaults.residue),
        }
    }

    /// Enable or disable printing finished rounds.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Number of rounds of tournaments created with this configuration.
    pub fn with_round_count(mut self, value: usize) -> Self {
        self.round_count = value;
        self
    }

    /// Fix the seed of the pairing random source, making pairings reproducible.
    pub fn with_seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    /// Choose what happens to players left without a new opponent.
    pub fn with_residue_policy(mut self, value: ResiduePolicy) -> Self {
        self.residue = value;
        self
    }

    /// True when traces go to a log file.
    pub fn logs_to_file(&self) -> bool {
        self.log
    }

    /// Configured number of rounds.
    pub fn round_count(&self) -> usize {
        self.round_count
    }

    /// Configured residue policy.
    pub fn residue_policy(&self) -> ResiduePolicy {
        self.residue
    }

    /// A random source seeded from [`Configuration::with_seed`], or from entropy.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
