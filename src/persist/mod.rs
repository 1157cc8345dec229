use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::model::error::EngineError;
use crate::model::game_state::GameState;

const SAVE_FILE: &str = "save.json";

/// Whole-object save slot for [`GameState`]. Writes go to a temp file and
/// are renamed into place, so a crash mid-save leaves either the old or the
/// new state on disk, never a torn one.
#[derive(Debug)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Save slot under the platform data directory.
    pub fn at_default_location() -> Self {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("firenze");
        fs::create_dir_all(&path).ok();
        path.push(SAVE_FILE);
        Self::new(path)
    }

    pub fn load(&self) -> Result<Option<GameState>, EngineError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let state = serde_json::from_str(&content)
                    .map_err(|e| EngineError::Persistence(e.into()))?;
                Ok(Some(state))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(EngineError::Persistence(err.into())),
        }
    }

    pub fn save(&self, state: &GameState) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| EngineError::Persistence(e.into()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| EngineError::Persistence(e.into()))?;
        fs::rename(&tmp, &self.path).map_err(|e| EngineError::Persistence(e.into()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), EngineError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(EngineError::Persistence(err.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SaveStore {
        SaveStore::new(dir.path().join(SAVE_FILE))
    }

    #[test]
    fn missing_save_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_reproduces_the_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut state = GameState::default();
        state.change_money(-40);
        state.change_reputation(12);
        state.started = true;

        store.save(&state).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn save_overwrites_the_whole_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&GameState::default()).unwrap();
        let mut state = GameState::default();
        state.money = 9999;
        store.save(&state).unwrap();

        assert_eq!(store.load().unwrap().unwrap().money, 9999);
    }

    #[test]
    fn clear_removes_the_slot_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&GameState::default()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
