//! User naming overrides.
//!
//! Overrides are the single persistent source of user intent: everything
//! else is recomputed from live data on each pass. Device and entity
//! overrides store a basename that replaces the generated one; area
//! overrides store a full display name that replaces the registry name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use crate::error::CoreError;

/// Which layer an override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OverrideScope {
    /// Keyed by area id, stores a full display name.
    Area,
    /// Keyed by device id, stores a device basename.
    Device,
    /// Keyed by entity registry id (stable across renames), stores an
    /// entity basename.
    Entity,
}

/// Persistent store of naming overrides. At most one entry per
/// (scope, id).
pub trait OverrideStore: Send + Sync {
    fn get(&self, scope: OverrideScope, id: &str) -> Option<String>;

    fn set(&self, scope: OverrideScope, id: &str, name: &str) -> Result<(), CoreError>;

    /// Returns whether an entry existed.
    fn remove(&self, scope: OverrideScope, id: &str) -> Result<bool, CoreError>;

    fn all(&self, scope: OverrideScope) -> BTreeMap<String, String>;
}

// ── JSON file store ─────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct OverrideData {
    #[serde(default)]
    areas: BTreeMap<String, String>,
    #[serde(default)]
    devices: BTreeMap<String, String>,
    #[serde(default)]
    entities: BTreeMap<String, String>,
}

impl OverrideData {
    fn map(&self, scope: OverrideScope) -> &BTreeMap<String, String> {
        match scope {
            OverrideScope::Area => &self.areas,
            OverrideScope::Device => &self.devices,
            OverrideScope::Entity => &self.entities,
        }
    }

    fn map_mut(&mut self, scope: OverrideScope) -> &mut BTreeMap<String, String> {
        match scope {
            OverrideScope::Area => &mut self.areas,
            OverrideScope::Device => &mut self.devices,
            OverrideScope::Entity => &mut self.entities,
        }
    }
}

/// File-backed store. The whole file is rewritten on every change via a
/// temp-file rename, so readers never observe a torn write.
pub struct JsonOverrideStore {
    path: PathBuf,
    data: RwLock<OverrideData>,
}

impl JsonOverrideStore {
    /// Open (or lazily create) the store at `path`. A missing file is an
    /// empty store; a corrupt file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| CoreError::OverrideStore {
                message: format!("cannot parse {}: {e}", path.display()),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => OverrideData::default(),
            Err(e) => {
                return Err(CoreError::OverrideStore {
                    message: format!("cannot read {}: {e}", path.display()),
                });
            }
        };
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn persist(&self, data: &OverrideData) -> Result<(), CoreError> {
        let io_err = |e: std::io::Error| CoreError::OverrideStore {
            message: format!("cannot write {}: {e}", self.path.display()),
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let json = serde_json::to_string_pretty(data).map_err(|e| CoreError::OverrideStore {
            message: format!("cannot serialize overrides: {e}"),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn lock_poisoned() -> CoreError {
        CoreError::Internal("override store lock poisoned".into())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OverrideStore for JsonOverrideStore {
    fn get(&self, scope: OverrideScope, id: &str) -> Option<String> {
        let data = self.data.read().ok()?;
        data.map(scope).get(id).cloned()
    }

    fn set(&self, scope: OverrideScope, id: &str, name: &str) -> Result<(), CoreError> {
        let mut data = self.data.write().map_err(|_| Self::lock_poisoned())?;
        data.map_mut(scope).insert(id.to_string(), name.to_string());
        debug!(%scope, id, name, "override set");
        self.persist(&data)
    }

    fn remove(&self, scope: OverrideScope, id: &str) -> Result<bool, CoreError> {
        let mut data = self.data.write().map_err(|_| Self::lock_poisoned())?;
        let existed = data.map_mut(scope).remove(id).is_some();
        if existed {
            debug!(%scope, id, "override removed");
            self.persist(&data)?;
        }
        Ok(existed)
    }

    fn all(&self, scope: OverrideScope) -> BTreeMap<String, String> {
        self.data
            .read()
            .map(|data| data.map(scope).clone())
            .unwrap_or_default()
    }
}

// ── In-memory store ─────────────────────────────────────────────────

/// Ephemeral store for tests and dry runs.
#[derive(Default)]
pub struct MemoryOverrideStore {
    data: RwLock<OverrideData>,
}

impl MemoryOverrideStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverrideStore for MemoryOverrideStore {
    fn get(&self, scope: OverrideScope, id: &str) -> Option<String> {
        let data = self.data.read().ok()?;
        data.map(scope).get(id).cloned()
    }

    fn set(&self, scope: OverrideScope, id: &str, name: &str) -> Result<(), CoreError> {
        let mut data = self
            .data
            .write()
            .map_err(|_| JsonOverrideStore::lock_poisoned())?;
        data.map_mut(scope).insert(id.to_string(), name.to_string());
        Ok(())
    }

    fn remove(&self, scope: OverrideScope, id: &str) -> Result<bool, CoreError> {
        let mut data = self
            .data
            .write()
            .map_err(|_| JsonOverrideStore::lock_poisoned())?;
        Ok(data.map_mut(scope).remove(id).is_some())
    }

    fn all(&self, scope: OverrideScope) -> BTreeMap<String, String> {
        self.data
            .read()
            .map(|data| data.map(scope).clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn json_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");

        let store = JsonOverrideStore::open(&path).unwrap();
        store.set(OverrideScope::Device, "dev1", "Deckenlicht").unwrap();
        store.set(OverrideScope::Area, "bad", "Badezimmer").unwrap();

        // fresh handle reads back from disk
        let reopened = JsonOverrideStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(OverrideScope::Device, "dev1").as_deref(),
            Some("Deckenlicht")
        );
        assert_eq!(
            reopened.get(OverrideScope::Area, "bad").as_deref(),
            Some("Badezimmer")
        );
        assert!(reopened.get(OverrideScope::Entity, "dev1").is_none());
    }

    #[test]
    fn remove_reports_existence() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonOverrideStore::open(dir.path().join("o.json")).unwrap();

        store.set(OverrideScope::Entity, "uuid-1", "Spiegel").unwrap();
        assert!(store.remove(OverrideScope::Entity, "uuid-1").unwrap());
        assert!(!store.remove(OverrideScope::Entity, "uuid-1").unwrap());
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonOverrideStore::open(dir.path().join("absent.json")).unwrap();
        assert!(store.all(OverrideScope::Device).is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonOverrideStore::open(&path),
            Err(CoreError::OverrideStore { .. })
        ));
    }
}
