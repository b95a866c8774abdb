// ── Preference persistence ──
//
// Remembers the last-used sort and version filter across sessions.
// Storage is pluggable; every failure degrades to defaults and is logged,
// never surfaced to the feed.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::warn;

use crate::model::{Category, QueryParameters, SortKey, VersionTag};

/// Storage key for the saved sort order.
pub const SORT_KEY: &str = "sortBy";
/// Storage key for the saved JupyterLab version filter.
pub const VERSION_KEY: &str = "selectedVersion";

/// Raised by a `Persistence` backend. Callers log and continue.
#[derive(Debug, Clone, thiserror::Error)]
#[error("preference storage failed: {0}")]
pub struct PersistenceError(pub String);

/// Key/value store for user preferences.
pub trait Persistence: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

// ── In-memory backend ────────────────────────────────────────────────

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let values = self
            .values
            .lock()
            .map_err(|_| PersistenceError("preference store poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values
            .lock()
            .map_err(|_| PersistenceError("preference store poisoned".into()))?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.values
            .lock()
            .map_err(|_| PersistenceError("preference store poisoned".into()))?
            .remove(key);
        Ok(())
    }
}

// ── Typed access ─────────────────────────────────────────────────────

/// Preferences read back from storage. Missing or unreadable values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedPreferences {
    pub sort: Option<SortKey>,
    /// `Some(None)` is a saved "all versions" choice.
    pub version: Option<Option<VersionTag>>,
}

/// Explicit choices for this session (command-line flags, links) that win
/// over anything saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceOverrides {
    pub search_text: Option<String>,
    pub category: Option<Category>,
    pub sort: Option<SortKey>,
    pub version: Option<Option<VersionTag>>,
}

/// Typed wrapper that swallows backend failures.
#[derive(Clone, Copy)]
pub struct Preferences<'a> {
    store: &'a dyn Persistence,
}

impl<'a> Preferences<'a> {
    pub fn new(store: &'a dyn Persistence) -> Self {
        Self { store }
    }

    /// Read saved preferences, ignoring failures and unrecognized values.
    pub fn load(&self) -> SavedPreferences {
        let sort = self.read(SORT_KEY).and_then(|raw| match raw.parse::<SortKey>() {
            Ok(sort) => Some(sort),
            Err(_) => {
                warn!(value = %raw, "ignoring unrecognized saved sort");
                None
            }
        });
        let version = self
            .read(VERSION_KEY)
            .and_then(|raw| match VersionTag::parse_choice(&raw) {
                Ok(version) => Some(version),
                Err(e) => {
                    warn!(error = %e, "ignoring unrecognized saved version");
                    None
                }
            });
        SavedPreferences { sort, version }
    }

    /// Starting parameters: overrides, then saved values, then defaults.
    pub fn resolve(&self, overrides: PreferenceOverrides) -> QueryParameters {
        let saved = self.load();
        QueryParameters {
            search_text: overrides.search_text.unwrap_or_default(),
            category: overrides.category,
            sort: overrides.sort.or(saved.sort).unwrap_or_default(),
            version: overrides.version.or(saved.version).flatten(),
        }
    }

    pub fn save_sort(&self, sort: SortKey) {
        self.write(SORT_KEY, sort.as_str());
    }

    pub fn save_version(&self, version: Option<VersionTag>) {
        self.write(VERSION_KEY, VersionTag::choice_str(version));
    }

    /// Forget everything saved.
    pub fn clear(&self) {
        for key in [SORT_KEY, VERSION_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "failed to clear preference");
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.load(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to load preference");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.save(key, value) {
            warn!(key, error = %e, "failed to save preference");
        }
    }
}
