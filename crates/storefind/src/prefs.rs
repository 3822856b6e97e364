//! Persisted search preferences.
//!
//! Preferences are the only cross-session state. They live behind the
//! [`KeyValueStore`] capability so production code can bind them to durable
//! storage and tests to an in-memory map. A corrupt persisted value never
//! errors: it degrades to defaults and the next write repairs it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use storefind_catalog::Coordinates;
use tracing::{debug, warn};

use crate::pipeline::SortKey;

/// Storage key under which the preference blob is persisted.
pub const PREFS_KEY: &str = "storefind.preferences";

/// A durable, process-spanning string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory binding, used by tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore(BTreeMap<String, String>);

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }
}

/// File-backed binding: one JSON object per file.
///
/// Write failures are logged and swallowed; losing a preference write is
/// never worth failing a search over.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
    cache: BTreeMap<String, String>,
}

impl FileKeyValueStore {
    /// Open (or lazily create) the store at `path`.
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        let cache = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        Self { path, cache }
    }

    /// Open the store in the per-user data directory.
    #[cfg(feature = "system-dirs")]
    #[must_use]
    pub fn in_user_data_dir() -> Option<Self> {
        let dirs = directories::ProjectDirs::from("", "", "storefind")?;
        let dir = dirs.data_dir();
        if let Err(error) = std::fs::create_dir_all(dir) {
            warn!(?error, ?dir, "could not create preferences directory");
            return None;
        }
        Some(Self::open(dir.join("preferences.json")))
    }

    fn flush(&self) {
        let text = match serde_json::to_string_pretty(&self.cache) {
            Ok(text) => text,
            Err(error) => {
                warn!(?error, "could not serialize preference store");
                return;
            }
        };
        if let Err(error) = std::fs::write(&self.path, text) {
            warn!(?error, path = ?self.path, "could not persist preferences");
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.cache.insert(key.to_string(), value.to_string());
        self.flush();
    }
}

/// Everything the locator remembers across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub last_search: String,
    pub sort_by: SortKey,
    pub selected_services: Vec<String>,
    pub open_now: bool,
    pub last_location: Option<Coordinates>,
    pub preferred_store_id: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            last_search: String::new(),
            sort_by: SortKey::Distance,
            selected_services: Vec::new(),
            open_now: false,
            last_location: None,
            preferred_store_id: None,
        }
    }
}

/// A shallow, field-level update. `None` fields are left untouched;
/// double-option fields can explicitly clear their target.
#[derive(Debug, Clone, Default)]
pub struct PreferencesPatch {
    pub last_search: Option<String>,
    pub sort_by: Option<SortKey>,
    pub selected_services: Option<Vec<String>>,
    pub open_now: Option<bool>,
    pub last_location: Option<Option<Coordinates>>,
    pub preferred_store_id: Option<Option<String>>,
}

impl PreferencesPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_search.is_none()
            && self.sort_by.is_none()
            && self.selected_services.is_none()
            && self.open_now.is_none()
            && self.last_location.is_none()
            && self.preferred_store_id.is_none()
    }

    fn apply(self, prefs: &mut Preferences) {
        if let Some(v) = self.last_search {
            prefs.last_search = v;
        }
        if let Some(v) = self.sort_by {
            prefs.sort_by = v;
        }
        if let Some(v) = self.selected_services {
            prefs.selected_services = v;
        }
        if let Some(v) = self.open_now {
            prefs.open_now = v;
        }
        if let Some(v) = self.last_location {
            prefs.last_location = v;
        }
        if let Some(v) = self.preferred_store_id {
            prefs.preferred_store_id = v;
        }
    }
}

/// Preference persistence over an injected [`KeyValueStore`].
#[derive(Debug)]
pub struct PreferenceStore<K: KeyValueStore> {
    store: K,
}

impl<K: KeyValueStore> PreferenceStore<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Current preferences, merged over defaults.
    ///
    /// An unparsable persisted value falls back to defaults rather than
    /// erroring.
    #[must_use]
    pub fn get(&self) -> Preferences {
        self.stored().unwrap_or_default()
    }

    /// The persisted preferences, or `None` when nothing usable has been
    /// written yet.
    #[must_use]
    pub fn stored(&self) -> Option<Preferences> {
        let raw = self.store.get(PREFS_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(prefs) => Some(prefs),
            Err(error) => {
                warn!(?error, "persisted preferences corrupt, using defaults");
                None
            }
        }
    }

    /// Shallow-merge a patch into the persisted preferences.
    pub fn merge(&mut self, patch: PreferencesPatch) {
        if patch.is_empty() {
            return;
        }
        let mut prefs = self.get();
        patch.apply(&mut prefs);
        match serde_json::to_string(&prefs) {
            Ok(json) => {
                self.store.set(PREFS_KEY, &json);
                debug!("preferences persisted");
            }
            Err(error) => warn!(?error, "could not serialize preferences"),
        }
    }

    pub fn into_inner(self) -> K {
        self.store
    }
}
