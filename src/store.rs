//! Where players and tournaments are kept between runs.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use crate::{error::TournamentError, player::Player, record::TournamentRecord};

/// Persistence of registered players and finished tournaments.
pub trait TournamentStore {
    /// Every registered player, in registration order.
    fn load_players(&self) -> anyhow::Result<Vec<Player>>;

    /// Registers `player`.
    ///
    /// # Errors
    /// [`TournamentError::DuplicatePlayer`] when the chess id is already registered.
    fn save_player(&mut self, player: &Player) -> anyhow::Result<()>;

    /// Every stored tournament, in the order they were saved.
    fn load_tournaments(&self) -> anyhow::Result<Vec<TournamentRecord>>;

    /// Appends `tournament` to the stored ones.
    fn save_tournament(&mut self, tournament: &TournamentRecord) -> anyhow::Result<()>;
}

/// Stores everything as pretty-printed JSON arrays in `players.json` and
/// `tournaments.json` inside a data directory.
///
/// A missing file reads as an empty list. The directory is created on first save.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    /// File name of the player list.
    pub const PLAYERS_FILE: &'static str = "players.json";
    /// File name of the tournament list.
    pub const TOURNAMENTS_FILE: &'static str = "tournaments.json";

    /// A store rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> JsonStore {
        JsonStore {
            data_dir: data_dir.into(),
        }
    }

    /// Directory holding the files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn load<T: DeserializeOwned>(&self, file: &str) -> anyhow::Result<Vec<T>> {
        let path = self.data_dir.join(file);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no file yet, starting empty");
                return Ok(vec![]);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    fn append<T: Serialize>(&self, file: &str, item: &T) -> anyhow::Result<()> {
        let mut items: Vec<serde_json::Value> = self.load(file)?;
        items.push(serde_json::to_value(item)?);

        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        let path = self.data_dir.join(file);
        let json = serde_json::to_string_pretty(&items)?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))
    }
}

impl TournamentStore for JsonStore {
    fn load_players(&self) -> anyhow::Result<Vec<Player>> {
        self.load(Self::PLAYERS_FILE)
    }

    #[instrument(skip_all, fields(player = %player.chess_id))]
    fn save_player(&mut self, player: &Player) -> anyhow::Result<()> {
        if self.load_players()?.contains(player) {
            return Err(TournamentError::DuplicatePlayer(player.chess_id.clone()).into());
        }
        self.append(Self::PLAYERS_FILE, player)?;
        debug!("player saved");
        Ok(())
    }

    fn load_tournaments(&self) -> anyhow::Result<Vec<TournamentRecord>> {
        self.load(Self::TOURNAMENTS_FILE)
    }

    #[instrument(skip_all, fields(tournament = %tournament.name))]
    fn save_tournament(&mut self, tournament: &TournamentRecord) -> anyhow::Result<()> {
        self.append(Self::TOURNAMENTS_FILE, tournament)?;
        debug!("tournament saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn temp_store(name: &str) -> JsonStore {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "swiss_store_{name}_{}_{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = fs::remove_dir_all(&dir);
        JsonStore::new(dir)
    }

    fn player(id: &str) -> Player {
        Player::new(id.parse().unwrap(), "Magnus", "Carlsen", "1990-11-30")
    }

    fn record(name: &str) -> TournamentRecord {
        TournamentRecord {
            name: name.into(),
            location: "Oslo".into(),
            start_date: "2025-05-01".into(),
            end_date: "2025-05-03".into(),
            round_number: 4,
            round_list: vec![],
            player_list: vec![player("NO00001"), player("NO00002")],
            description: "".into(),
        }
    }

    #[test]
    fn missing_files_are_empty() {
        let store = temp_store("missing");
        assert!(store.load_players().unwrap().is_empty());
        assert!(store.load_tournaments().unwrap().is_empty());
    }

    #[test]
    fn players_are_appended() {
        let mut store = temp_store("players");
        store.save_player(&player("AB12345")).unwrap();
        store.save_player(&player("CD67890")).unwrap();

        let ids: Vec<_> = store
            .load_players()
            .unwrap()
            .into_iter()
            .map(|p| p.chess_id.to_string())
            .collect();
        assert_eq!(ids, ["AB12345", "CD67890"]);

        let err = store.save_player(&player("AB12345")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TournamentError>(),
            Some(TournamentError::DuplicatePlayer(_))
        ));
        let _ = fs::remove_dir_all(store.data_dir());
    }

    #[test]
    fn tournaments_are_appended() {
        let mut store = temp_store("tournaments");
        store.save_tournament(&record("First")).unwrap();
        store.save_tournament(&record("Second")).unwrap();

        let loaded = store.load_tournaments().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], record("First"));
        assert_eq!(loaded[1].name, "Second");
        let _ = fs::remove_dir_all(store.data_dir());
    }

    #[test]
    fn corrupted_file_is_an_error() {
        let store = temp_store("corrupted");
        fs::create_dir_all(store.data_dir()).unwrap();
        fs::write(store.data_dir().join(JsonStore::PLAYERS_FILE), "{ not json").unwrap();
        let err = store.load_players().unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
        let _ = fs::remove_dir_all(store.data_dir());
    }
}
