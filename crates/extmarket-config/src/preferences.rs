// ── File-backed preference store ──
//
// Saved sort/version choices live in a small TOML table in the platform
// data directory. Every operation re-reads the file so separate CLI
// invocations see each other's writes.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use extmarket_core::{Persistence, PersistenceError};

use crate::{ConfigError, home_fallback, project_dirs};

/// Resolve the preferences file path via XDG / platform conventions.
pub fn preferences_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".local/share").join("preferences.toml"),
        |dirs| dirs.data_dir().join("preferences.toml"),
    )
}

/// `Persistence` backed by a TOML file of string values.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the canonical preferences path.
    pub fn at_default_path() -> Self {
        Self::new(preferences_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every saved key and value.
    pub fn entries(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl Persistence for FilePersistence {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let mut entries = self.entries().map_err(to_persistence)?;
        Ok(entries.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries().map_err(to_persistence)?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_entries(&entries).map_err(to_persistence)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries().map_err(to_persistence)?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).map_err(to_persistence)?;
        }
        Ok(())
    }
}

#[allow(clippy::needless_pass_by_value)]
fn to_persistence(err: ConfigError) -> PersistenceError {
    PersistenceError(err.to_string())
}
