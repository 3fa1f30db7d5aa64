//! Snapshot persistence
//!
//! The whole [`ApplicationState`] is stored as one JSON document. Loading
//! never fails: a missing or unreadable snapshot yields the caller's default.
//! Saving replaces the file through a temp-file rename so a crash mid-write
//! leaves the previous snapshot intact.

use std::fs;
use std::path::{Path, PathBuf};
use studiolive_core::{ApplicationState, StudioError, StudioResult};

/// Where the authoritative state is checkpointed
pub trait Persistence {
    /// Read the last checkpoint, or `default` when there is none
    fn load(&self, default: ApplicationState) -> ApplicationState;

    /// Fire-and-forget checkpoint
    fn save(&self, state: &ApplicationState);
}

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot, or return `default` on any failure
    pub fn load(&self, default: ApplicationState) -> ApplicationState {
        if !self.path.exists() {
            log::info!("No snapshot at {}, starting fresh", self.path.display());
            return default;
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("Failed to read snapshot {}: {}", self.path.display(), e);
                return default;
            }
        };

        match serde_json::from_str::<ApplicationState>(&contents) {
            Ok(state) => {
                log::info!("Resumed state from {}", self.path.display());
                state
            }
            Err(e) => {
                log::warn!("Ignoring corrupt snapshot {}: {}", self.path.display(), e);
                default
            }
        }
    }

    /// Serialize and atomically overwrite the snapshot
    pub fn try_save(&self, state: &ApplicationState) -> StudioResult<()> {
        let data = serde_json::to_string(state).map_err(|e| {
            StudioError::persistence(format!("Failed to serialize state: {}", e))
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StudioError::persistence(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Fire-and-forget save; failures are logged and otherwise ignored
    pub fn save(&self, state: &ApplicationState) {
        match self.try_save(state) {
            Ok(()) => log::debug!("Saved state to {}", self.path.display()),
            Err(e) => log::error!("Failed to persist state: {}", e),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Persistence for SnapshotFile {
    fn load(&self, default: ApplicationState) -> ApplicationState {
        SnapshotFile::load(self, default)
    }

    fn save(&self, state: &ApplicationState) {
        SnapshotFile::save(self, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn default_state() -> ApplicationState {
        ApplicationState::new("https://studio.youtube.com/")
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join(".save").join("app.json"));

        let mut state = ApplicationState::new("https://studio.youtube.com/video/abc/livestreaming");
        state.extra.insert("chat".into(), json!({ "open": true, "width": 320 }));

        file.try_save(&state).unwrap();
        assert_eq!(file.load(default_state()), state);
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("absent.json"));
        assert_eq!(file.load(default_state()), default_state());
    }

    #[test]
    fn test_corrupt_file_yields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, "{\"currentUrl\": ").unwrap();
        assert_eq!(SnapshotFile::new(&path).load(default_state()), default_state());

        fs::write(&path, "{\"other\": 1}").unwrap();
        assert_eq!(SnapshotFile::new(&path).load(default_state()), default_state());
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.json");
        let file = SnapshotFile::new(&path);

        file.try_save(&ApplicationState::new("first")).unwrap();
        file.try_save(&ApplicationState::new("second")).unwrap();

        assert_eq!(file.load(default_state()).current_url, "second");
        assert!(!dir.path().join("app.json.tmp").exists());
    }

    #[test]
    fn test_failed_save_does_not_panic() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes the rename fail
        let path = dir.path().join("app.json");
        fs::create_dir_all(path.join("blocker")).unwrap();
        let file = SnapshotFile::new(&path);

        assert!(file.try_save(&default_state()).is_err());
        file.save(&default_state());
        assert!(!dir.path().join("app.json.tmp").exists());
    }
}
