//! Durable storage for the store's persisted subset.
//!
//! The snapshot is a versioned JSON document stored under a fixed key: a file
//! in the user's config directory on native, `localStorage` on the web.
//! Anything that fails to read, parse or match the schema version falls back
//! to defaults; write failures are logged and otherwise ignored.

use std::collections::HashMap;

use bevy::log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::model::{AppStats, FoodDetection, NutritionEntry, Theme, UserIdentity};

pub const SNAPSHOT_VERSION: u32 = 1;
pub const STORAGE_KEY: &str = "mvp-fitness-storage";
#[cfg(not(target_arch = "wasm32"))]
pub const CONFIG_DIR_NAME: &str = "fitcoach-motion";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("browser storage failed: {0}")]
    Browser(String),
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key-value backend holding serialized snapshots.
pub trait SnapshotStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError>;
}

// ============================================================================
// Snapshot Document
// ============================================================================

/// The fields of `AppState` that survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub user: Option<UserIdentity>,
    pub is_authenticated: bool,
    pub recent_searches: Vec<String>,
    pub nutrition_history: Vec<NutritionEntry>,
    pub recent_detections: Vec<FoodDetection>,
    pub stats: AppStats,
    pub theme: Theme,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    state: PersistedState,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

pub fn encode_snapshot(state: &PersistedState) -> Result<String, StorageError> {
    let snapshot = Snapshot { version: SNAPSHOT_VERSION, state: state.clone() };
    Ok(serde_json::to_string(&snapshot)?)
}

/// Returns `None` for anything other than a well-formed current-version snapshot.
pub fn decode_snapshot(payload: &str) -> Option<PersistedState> {
    let probe = match serde_json::from_str::<VersionProbe>(payload) {
        Ok(probe) => probe,
        Err(e) => {
            warn!("Discarding unreadable store snapshot: {}", e);
            return None;
        }
    };
    if probe.version != SNAPSHOT_VERSION {
        warn!(
            "Discarding store snapshot with version {} (expected {})",
            probe.version, SNAPSHOT_VERSION
        );
        return None;
    }
    match serde_json::from_str::<Snapshot>(payload) {
        Ok(snapshot) => Some(snapshot.state),
        Err(e) => {
            warn!("Discarding store snapshot with unexpected shape: {}", e);
            None
        }
    }
}

pub fn load_snapshot(storage: &dyn SnapshotStorage, key: &str) -> Option<PersistedState> {
    match storage.read(key) {
        Ok(Some(payload)) => {
            let state = decode_snapshot(&payload)?;
            debug!(
                "Loaded store snapshot '{}' ({} entries, {} detections)",
                key,
                state.nutrition_history.len(),
                state.recent_detections.len()
            );
            Some(state)
        }
        Ok(None) => {
            debug!("No store snapshot found under '{}'", key);
            None
        }
        Err(e) => {
            warn!("Failed to read store snapshot '{}': {}", key, e);
            None
        }
    }
}

/// Best-effort write. Returns whether the snapshot reached storage.
pub fn save_snapshot(storage: &mut dyn SnapshotStorage, key: &str, state: &PersistedState) -> bool {
    let result = encode_snapshot(state).and_then(|payload| storage.write(key, &payload));
    match result {
        Ok(()) => {
            debug!("Saved store snapshot '{}'", key);
            true
        }
        Err(e) => {
            warn!("Failed to save store snapshot '{}': {}", key, e);
            false
        }
    }
}

// ============================================================================
// Backends
// ============================================================================

#[derive(Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, payload: impl Into<String>) {
        self.entries.insert(key.into(), payload.into());
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside `dir`.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileStorage {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn in_config_dir() -> Result<Self, StorageError> {
        dirs::config_dir()
            .map(|p| Self::new(p.join(CONFIG_DIR_NAME)))
            .ok_or(StorageError::NoConfigDir)
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SnapshotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), payload)?;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub struct BrowserStorage;

#[cfg(target_arch = "wasm32")]
impl SnapshotStorage for BrowserStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        use gloo_storage::Storage;
        use gloo_storage::errors::StorageError as GlooError;
        match gloo_storage::LocalStorage::get::<String>(key) {
            Ok(content) => Ok(Some(content)),
            Err(GlooError::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(StorageError::Browser(e.to_string())),
        }
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        use gloo_storage::Storage;
        gloo_storage::LocalStorage::set(key, payload).map_err(|e| StorageError::Browser(e.to_string()))
    }
}

/// Storage for the current platform. Falls back to memory when the config
/// directory is unavailable, so the app still runs (without durability).
#[cfg(not(target_arch = "wasm32"))]
pub fn platform_storage() -> Box<dyn SnapshotStorage> {
    match FileStorage::in_config_dir() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            warn!("Store snapshots will not persist: {}", e);
            Box::new(MemoryStorage::default())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn platform_storage() -> Box<dyn SnapshotStorage> {
    Box::new(BrowserStorage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> PersistedState {
        PersistedState {
            user: Some(UserIdentity::new("u1", "Ira")),
            is_authenticated: true,
            recent_searches: vec!["rice".into()],
            nutrition_history: Vec::new(),
            recent_detections: Vec::new(),
            stats: AppStats::default(),
            theme: Theme::Dark,
        }
    }

    #[test]
    fn snapshot_uses_camel_case_and_version() {
        let payload = encode_snapshot(&sample_state()).unwrap();

        assert!(payload.contains("\"version\":1"));
        assert!(payload.contains("\"isAuthenticated\":true"));
        assert!(payload.contains("\"monthlySavings\":3540.0"));
        assert!(payload.contains("\"theme\":\"dark\""));
        assert_eq!(decode_snapshot(&payload), Some(sample_state()));
    }

    #[test]
    fn version_mismatch_and_garbage_fall_back() {
        let payload = encode_snapshot(&sample_state()).unwrap().replace("\"version\":1", "\"version\":0");

        assert_eq!(decode_snapshot(&payload), None);
        assert_eq!(decode_snapshot("not json"), None);
        assert_eq!(decode_snapshot("{\"version\":1,\"state\":{\"theme\":\"neon\"}}"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn file_storage_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.read(STORAGE_KEY).unwrap(), None);
        assert!(save_snapshot(&mut storage, STORAGE_KEY, &sample_state()));
        assert_eq!(load_snapshot(&storage, STORAGE_KEY), Some(sample_state()));
    }

    struct BrokenStorage;

    impl SnapshotStorage for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Browser("quota exceeded".into()))
        }

        fn write(&mut self, _key: &str, _payload: &str) -> Result<(), StorageError> {
            Err(StorageError::Browser("quota exceeded".into()))
        }
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let mut storage = BrokenStorage;

        assert_eq!(load_snapshot(&storage, STORAGE_KEY), None);
        assert!(!save_snapshot(&mut storage, STORAGE_KEY, &sample_state()));
    }
}
