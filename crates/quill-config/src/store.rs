//! JSON store persistence: atomic save, forgiving load.
//!
//! Save writes to `store.json.tmp` then renames over `store.json` so a
//! crash mid-write can never corrupt the document. Load treats a missing or
//! unparseable file as a fresh start and returns `None` rather than erroring.

use std::path::{Path, PathBuf};

use quill_common::ConfigError;

use crate::schema::StoreState;

/// Platform default store path: `~/.quill/desktop/store.json`.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".quill").join("desktop").join("store.json"))
}

/// Write the store to a specific path, creating parent directories.
pub fn save_store_to_path(state: &StoreState, path: &Path) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| ConfigError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json).map_err(|e| ConfigError::Write {
        path: tmp_path.clone(),
        message: e.to_string(),
    })?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        // Rename failed, fall back to a direct write (Windows compat).
        tracing::warn!("atomic rename failed ({e}), falling back to direct write");
        std::fs::write(path, &json).map_err(|e2| ConfigError::Write {
            path: path.to_path_buf(),
            message: e2.to_string(),
        })?;
    }

    tracing::debug!(path = %path.display(), "Store saved to disk");
    Ok(())
}

/// Load the store from its default location. `None` means fresh start.
pub fn load_store() -> Option<StoreState> {
    load_store_from_path(&default_store_path()?)
}

/// Load the store from a specific path.
///
/// Missing file, unreadable file and parse errors all yield `None`; a
/// corrupt store is never fatal.
pub fn load_store_from_path(path: &Path) -> Option<StoreState> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Store parse failed, starting fresh: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let state = StoreState {
            terminal_tabs: vec!["Terminal 1".into()],
            active_tab: Some(0),
            ..Default::default()
        };
        save_store_to_path(&state, &path).unwrap();

        let loaded = load_store_from_path(&path).expect("store should load");
        assert_eq!(loaded, state);
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_store_from_path(&dir.path().join("missing.json")).is_none());
    }

    #[test]
    fn load_corrupt_file_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json at all").unwrap();
        assert!(load_store_from_path(&path).is_none());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("store.json");
        save_store_to_path(&StoreState::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn save_cleans_up_tmp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        save_store_to_path(&StoreState::default(), &path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn save_overwrites_previous_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        save_store_to_path(&StoreState::default(), &path).unwrap();
        let updated = StoreState {
            active_repo: Some("/work/repo".into()),
            ..Default::default()
        };
        save_store_to_path(&updated, &path).unwrap();

        let loaded = load_store_from_path(&path).unwrap();
        assert_eq!(loaded.active_repo.as_deref(), Some("/work/repo"));
    }
}
