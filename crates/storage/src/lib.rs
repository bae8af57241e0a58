use directories::ProjectDirs;
use doc_model::Preferences;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which the viewer keeps its preference record.
pub const PREFERENCES_KEY: &str = "readerPrefs";

const STORE_FILE: &str = "storage.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key-value storage scoped to this application. Values are whole JSON
/// objects; there are no partial-field updates.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs =
            ProjectDirs::from("dev", "Folio", "Folio").ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_path(&self) -> PathBuf {
        self.root.join(STORE_FILE)
    }

    fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        let path = self.store_path();
        if !path.exists() {
            return Ok(Map::new());
        }

        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_all(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let bytes = serde_json::to_vec_pretty(entries)?;
        let staging = self.root.join(format!("{STORE_FILE}.tmp"));
        fs::write(&staging, bytes)?;
        fs::rename(staging, self.store_path())?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_owned(), value);
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

pub fn load_preferences(store: &impl KeyValueStore) -> Result<Preferences, StorageError> {
    match store.get(PREFERENCES_KEY)? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(Preferences::default()),
    }
}

pub fn save_preferences(
    store: &mut impl KeyValueStore,
    preferences: &Preferences,
) -> Result<(), StorageError> {
    let value = serde_json::to_value(preferences)?;
    tracing::debug!(?preferences, "saving preferences");
    store.set(PREFERENCES_KEY, value)
}

pub fn reset_preferences(store: &mut impl KeyValueStore) -> Result<(), StorageError> {
    store.remove(PREFERENCES_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = FileStore::with_root(temp.path());

        let prefs = Preferences {
            continuous: true,
            fit_width: false,
            lock_zoom: true,
            sidebar_collapsed: false,
        };

        save_preferences(&mut store, &prefs).expect("save should succeed");

        let reopened = FileStore::with_root(temp.path());
        let loaded = load_preferences(&reopened).expect("load should succeed");

        assert_eq!(loaded, prefs);
    }

    #[test]
    fn load_defaults_when_file_absent() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = FileStore::with_root(temp.path());

        let loaded = load_preferences(&store).expect("load should succeed");
        assert_eq!(loaded, Preferences::default());
    }

    #[test]
    fn preferences_are_stored_as_one_object_under_fixed_key() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = FileStore::with_root(temp.path());

        let prefs = Preferences { sidebar_collapsed: true, ..Preferences::default() };
        save_preferences(&mut store, &prefs)
            .expect("save should succeed");

        let raw = fs::read_to_string(temp.path().join(STORE_FILE)).expect("store file expected");
        let value: Value = serde_json::from_str(&raw).expect("store file should be json");

        assert_eq!(value[PREFERENCES_KEY]["sidebarCollapsed"], true);
        assert_eq!(value[PREFERENCES_KEY]["fitWidth"], false);
        assert!(!temp.path().join(format!("{STORE_FILE}.tmp")).exists());
    }

    #[test]
    fn unrelated_keys_survive_preference_writes() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = FileStore::with_root(temp.path());

        store.set("other", Value::from(42)).expect("set should succeed");
        save_preferences(&mut store, &Preferences::default()).expect("save should succeed");

        assert_eq!(store.get("other").expect("get should succeed"), Some(Value::from(42)));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = MemoryStore::new();
        save_preferences(&mut store, &Preferences { continuous: true, ..Preferences::default() })
            .expect("save should succeed");

        reset_preferences(&mut store).expect("reset should succeed");

        assert_eq!(load_preferences(&store).expect("load should succeed"), Preferences::default());
    }

    #[test]
    fn malformed_record_is_reported() {
        let mut store = MemoryStore::new();
        store.set(PREFERENCES_KEY, Value::from("not an object")).expect("set should succeed");

        assert!(matches!(load_preferences(&store), Err(StorageError::Serde(_))));
    }
}
