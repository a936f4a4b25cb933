//! Tournament participants and the roster that owns them.

use std::{fmt, hash::Hash, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::TournamentError;

/// A chess federation identifier: two ASCII letters followed by five digits (e.g. `AB12345`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    /// The identifier as written at registration.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PlayerId {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[..2].iter().all(u8::is_ascii_alphabetic)
            && bytes[2..].iter().all(u8::is_ascii_digit);
        if well_formed {
            Ok(PlayerId(s.to_owned()))
        } else {
            Err(TournamentError::InvalidPlayerId(s.to_owned()))
        }
    }
}

impl TryFrom<String> for PlayerId {
    type Error = TournamentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered participant.
///
/// Two players are the same entity when their [`PlayerId`]s match, whatever their other
/// fields say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Family name.
    pub last_name: String,
    /// Given name.
    pub first_name: String,
    /// Birth date as `YYYY-MM-DD`.
    pub birth_date: String,
    /// Unique identifier, immutable once registered.
    pub chess_id: PlayerId,
    /// Cumulative score in the current tournament.
    #[serde(default)]
    pub point: f64,
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.chess_id == other.chess_id
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.chess_id.hash(state);
    }
}

impl Player {
    /// Registers a new player with a zero score.
    pub fn new(
        chess_id: PlayerId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: impl Into<String>,
    ) -> Player {
        Player {
            last_name: last_name.into(),
            first_name: first_name.into(),
            birth_date: birth_date.into(),
            chess_id,
            point: 0.0,
        }
    }

    /// `"First Last"`, as shown on prompts and reports.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.first_name, self.last_name, self.chess_id
        )
    }
}

/// The canonical player collection of a tournament.
///
/// Membership is fixed once built. Scores are only written through [`Roster::award`], so a
/// player's score never diverges between copies.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Builds a roster, rejecting duplicated ids.
    pub fn new(players: Vec<Player>) -> Result<Roster, TournamentError> {
        for (i, player) in players.iter().enumerate() {
            if players[..i].contains(player) {
                return Err(TournamentError::DuplicatePlayer(player.chess_id.clone()));
            }
        }
        Ok(Roster { players })
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True when nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Ids in registration order.
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.chess_id.clone()).collect()
    }

    /// Looks a player up by id.
    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.chess_id == id)
    }

    /// Like [`Roster::get`], but an unknown id is an error.
    pub fn require(&self, id: &PlayerId) -> Result<&Player, TournamentError> {
        self.get(id)
            .ok_or_else(|| TournamentError::UnknownPlayer(id.clone()))
    }

    pub(crate) fn contains(&self, id: &PlayerId) -> bool {
        self.get(id).is_some()
    }

    /// Adds `points` to a player's cumulative score.
    pub(crate) fn award(&mut self, id: &PlayerId, points: f64) -> Result<(), TournamentError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.chess_id == id)
            .ok_or_else(|| TournamentError::UnknownPlayer(id.clone()))?;
        player.point += points;
        trace!(player = %id, points, total = player.point, "score updated");
        Ok(())
    }

    pub(crate) fn reset_scores(&mut self) {
        for player in &mut self.players {
            player.point = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn id(s: &str) -> PlayerId {
        s.parse().unwrap()
    }

    #[test]
    fn parses_well_formed_ids() {
        assert_eq!(id("AB12345").as_str(), "AB12345");
        assert_eq!(id("xy00000").to_string(), "xy00000");
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in ["", "AB1234", "AB123456", "A123456", "1B12345", "AB1234X", "ÀB12345"] {
            assert_eq!(
                bad.parse::<PlayerId>(),
                Err(TournamentError::InvalidPlayerId(bad.to_owned())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn players_are_identified_by_chess_id_only() {
        let mut a = Player::new(id("AB12345"), "Ada", "Lovelace", "1990-12-10");
        let b = Player::new(id("AB12345"), "Someone", "Else", "1980-01-01");
        a.point = 3.0;
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn roster_rejects_duplicates() {
        let players = vec![
            Player::new(id("AB12345"), "A", "A", "1990-01-01"),
            Player::new(id("CD12345"), "C", "C", "1990-01-01"),
            Player::new(id("AB12345"), "B", "B", "1990-01-01"),
        ];
        assert_eq!(
            Roster::new(players).unwrap_err(),
            TournamentError::DuplicatePlayer(id("AB12345"))
        );
    }

    #[test]
    fn award_accumulates_and_checks_membership() {
        let mut roster =
            Roster::new(vec![Player::new(id("AB12345"), "A", "A", "1990-01-01")]).unwrap();
        roster.award(&id("AB12345"), 1.0).unwrap();
        roster.award(&id("AB12345"), 0.5).unwrap();
        assert_eq!(roster.require(&id("AB12345")).unwrap().point, 1.5);
        assert_eq!(
            roster.award(&id("ZZ99999"), 1.0),
            Err(TournamentError::UnknownPlayer(id("ZZ99999")))
        );
    }

    #[test]
    fn player_json_uses_registry_field_names() {
        let json = r#"{"last_name":"Polgar","first_name":"Judit","birth_date":"1976-07-23","chess_id":"HU00042"}"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.chess_id, id("HU00042"));
        assert_eq!(player.point, 0.0);
        assert!(serde_json::from_str::<Player>(&json.replace("HU00042", "HU42")).is_err());
    }
}
