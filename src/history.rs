//! What already happened in a tournament, as seen by the pairing engine.

use std::collections::{HashMap, HashSet};

use crate::{outcome::BYE_POINTS, player::PlayerId, round::Round};

/// An unordered pair of players: `A vs B` and `B vs A` share the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PairKey(PlayerId, PlayerId);

impl PairKey {
    fn new(a: &PlayerId, b: &PlayerId) -> PairKey {
        if a <= b {
            PairKey(a.clone(), b.clone())
        } else {
            PairKey(b.clone(), a.clone())
        }
    }
}

/// Cumulative scores and already-played pairs, folded from every completed round.
///
/// Built fresh from the round list for each pairing pass; the round list itself stays the
/// append-only source of truth.
#[derive(Debug, Clone, Default)]
pub struct MatchHistory {
    played: HashSet<PairKey>,
    scores: HashMap<PlayerId, f64>,
    byes: HashMap<PlayerId, usize>,
}

impl MatchHistory {
    /// Folds `rounds` into a history. Unresolved matches still count as played.
    pub fn from_rounds(rounds: &[Round]) -> MatchHistory {
        let mut history = MatchHistory::default();
        for round in rounds {
            for game in round.matches() {
                let (first, second) = game.players();
                history.played.insert(PairKey::new(first, second));
                if let Some((a, b)) = game.scores() {
                    *history.scores.entry(first.clone()).or_default() += a;
                    *history.scores.entry(second.clone()).or_default() += b;
                }
            }
            for id in round.byes() {
                *history.scores.entry(id.clone()).or_default() += BYE_POINTS;
                *history.byes.entry(id.clone()).or_default() += 1;
            }
        }
        history
    }

    /// True when `a` and `b` already met, in either color order.
    pub fn have_played(&self, a: &PlayerId, b: &PlayerId) -> bool {
        self.played.contains(&PairKey::new(a, b))
    }

    /// Points accumulated so far; `0.0` for a player with no recorded game.
    pub fn score(&self, id: &PlayerId) -> f64 {
        self.scores.get(id).copied().unwrap_or(0.0)
    }

    /// Number of byes already awarded to `id`.
    pub fn byes(&self, id: &PlayerId) -> usize {
        self.byes.get(id).copied().unwrap_or(0)
    }

    /// Number of distinct pairs that have met.
    pub fn pair_count(&self) -> usize {
        self.played.len()
    }

    /// True before the first round.
    pub fn is_empty(&self) -> bool {
        self.played.is_empty() && self.byes.is_empty()
    }
}
