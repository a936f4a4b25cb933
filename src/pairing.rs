//! Swiss pairing.
//!
//! Round 1 is a uniform random shuffle. From round 2 on, players are ranked by cumulative
//! score (equal scores ordered by a fresh random tie-break on every pass) and paired greedily:
//! each player, from the top of the ranking down, takes the first lower-ranked player still
//! free that they have never faced.
//!
//! The greedy walk does not backtrack. Late in a tournament it can leave players with no
//! opponent they have not already met; those are reported in [`Pairing::unpaired`] and the
//! round applies its [`ResiduePolicy`](crate::configuration::ResiduePolicy).
//!
//! All randomness comes from the caller's [`Rng`], so a seeded generator gives reproducible
//! pairings.

use std::cmp::Ordering;

use rand::{seq::SliceRandom, Rng};
use tracing::{debug, instrument};

use crate::{history::MatchHistory, player::PlayerId};

/// The pairs of one round, in the order they were formed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pairing {
    /// (player 1, player 2) for every game of the round.
    pub pairs: Vec<(PlayerId, PlayerId)>,
    /// Players for whom no valid opponent was left.
    pub unpaired: Vec<PlayerId>,
}

impl Pairing {
    /// Paired players flattened: elements `2k` and `2k + 1` play each other.
    pub fn ordered(&self) -> Vec<&PlayerId> {
        self.pairs.iter().flat_map(|(a, b)| [a, b]).collect()
    }

    /// Number of games.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no game could be formed.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Pairs `players` for round `round_number` (1-based).
pub fn pair<R: Rng + ?Sized>(
    players: &[PlayerId],
    round_number: usize,
    history: &MatchHistory,
    rng: &mut R,
) -> Pairing {
    if round_number <= 1 {
        shuffle_pairing(players, rng)
    } else {
        swiss_pairing(players, history, rng)
    }
}

/// First-round pairing: shuffle, then take players two at a time.
///
/// With an odd count the last shuffled player is left unpaired.
pub fn shuffle_pairing<R: Rng + ?Sized>(players: &[PlayerId], rng: &mut R) -> Pairing {
    let mut shuffled = players.to_vec();
    shuffled.shuffle(rng);

    let mut pairing = Pairing::default();
    let mut chunks = shuffled.chunks_exact(2);
    for chunk in &mut chunks {
        pairing.pairs.push((chunk[0].clone(), chunk[1].clone()));
    }
    pairing.unpaired = chunks.remainder().to_vec();
    pairing
}

/// Players sorted by descending cumulative score, with their score.
///
/// Equal scores are ordered by a random key drawn for this call only.
pub fn rank_players<R: Rng + ?Sized>(
    players: &[PlayerId],
    history: &MatchHistory,
    rng: &mut R,
) -> Vec<(PlayerId, f64)> {
    let mut ranked = players
        .iter()
        .map(|id| (id.clone(), history.score(id), rng.gen::<f64>()))
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| descending(a.1, b.1).then_with(|| descending(a.2, b.2)));
    ranked
        .into_iter()
        .map(|(id, score, _tie_breaker)| (id, score))
        .collect()
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Pairing for rounds after the first: ranking then greedy no-repeat matching.
#[instrument(skip_all, fields(players = players.len()))]
pub fn swiss_pairing<R: Rng + ?Sized>(
    players: &[PlayerId],
    history: &MatchHistory,
    rng: &mut R,
) -> Pairing {
    // 1. rank by score
    let ranked = rank_players(players, history, rng);
    debug!(?ranked);

    // 2. greedy pairing: pair with the first valid opponent further down the ranking
    let mut used = vec![false; ranked.len()];
    let mut pairing = Pairing::default();
    for i in 0..ranked.len() {
        if used[i] {
            continue;
        }
        let (a, _) = &ranked[i];
        let opponent =
            (i + 1..ranked.len()).find(|&j| !used[j] && !history.have_played(a, &ranked[j].0));

        match opponent {
            Some(j) => {
                used[i] = true;
                used[j] = true;
                pairing.pairs.push((a.clone(), ranked[j].0.clone()));
            }
            // Every free player below `a` already faced them, and players above were
            // either paired or already tried `a`: nobody is left.
            None => pairing.unpaired.push(a.clone()),
        }
    }
    pairing
}
