//! Session Persistence
//!
//! Serializes the session into a versioned envelope and flushes it through an
//! injected store, one entry per product id, overwritten on every auto-save.
//! A full store is a result the caller sees, never a panic: editing continues
//! in memory when persistence fails.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::DesignSession;
use crate::ENGINE_VERSION;

/// Version of the serialized envelope. Bump on wire-contract changes.
pub const SCHEMA_VERSION: &str = "1.0.0";
/// Oldest envelope this engine still reads.
pub const MIN_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded writing {attempted} bytes")]
    QuotaExceeded { attempted: usize },

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported schema version {found}, engine requires >= {minimum}")]
    SchemaVersion { found: String, minimum: String },
}

/// The persisted wire envelope around a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub schema_version: String,
    pub engine_version: String,
    pub product_id: String,
    pub saved_at: DateTime<Utc>,
    pub session: DesignSession,
}

pub fn serialize_session(product_id: &str, session: &DesignSession) -> Result<Vec<u8>, StoreError> {
    let envelope = PersistedSession {
        schema_version: SCHEMA_VERSION.to_string(),
        engine_version: ENGINE_VERSION.to_string(),
        product_id: product_id.to_string(),
        saved_at: Utc::now(),
        session: session.clone(),
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Parses a persisted envelope, gating on schema compatibility.
pub fn deserialize_session(bytes: &[u8]) -> Result<PersistedSession, StoreError> {
    let envelope: PersistedSession = serde_json::from_slice(bytes)?;
    check_schema_version(&envelope.schema_version)?;
    Ok(envelope)
}

fn check_schema_version(found: &str) -> Result<(), StoreError> {
    let incompatible = |found: &str| StoreError::SchemaVersion {
        found: found.to_string(),
        minimum: MIN_SCHEMA_VERSION.to_string(),
    };
    let found_ver = semver::Version::parse(found).map_err(|_| incompatible(found))?;
    let min_ver = semver::Version::parse(MIN_SCHEMA_VERSION).map_err(|_| incompatible(found))?;
    if found_ver < min_ver {
        return Err(incompatible(found));
    }
    Ok(())
}

/// Injected persistence port. One entry per product id.
pub trait SessionStore {
    fn put(&mut self, product_id: &str, payload: &[u8]) -> Result<(), StoreError>;
    fn get(&self, product_id: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn remove(&mut self, product_id: &str) -> Result<(), StoreError>;
}

/// In-memory store with a byte capacity, modelling quota-bounded local
/// storage.
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    capacity_bytes: usize,
}

impl MemoryStore {
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity_bytes,
        }
    }

    fn used_excluding(&self, product_id: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != product_id)
            .map(|(_, v)| v.len())
            .sum()
    }
}

impl SessionStore for MemoryStore {
    fn put(&mut self, product_id: &str, payload: &[u8]) -> Result<(), StoreError> {
        if self.used_excluding(product_id) + payload.len() > self.capacity_bytes {
            return Err(StoreError::QuotaExceeded {
                attempted: payload.len(),
            });
        }
        self.entries.insert(product_id.to_string(), payload.to_vec());
        Ok(())
    }

    fn get(&self, product_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(product_id).cloned())
    }

    fn remove(&mut self, product_id: &str) -> Result<(), StoreError> {
        self.entries.remove(product_id);
        Ok(())
    }
}

/// File-backed store: one JSON file per product id under a root directory.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_path(&self, product_id: &str) -> PathBuf {
        self.root.join(format!("{product_id}.json"))
    }
}

impl SessionStore for DirStore {
    fn put(&mut self, product_id: &str, payload: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.entry_path(product_id), payload)?;
        Ok(())
    }

    fn get(&self, product_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.entry_path(product_id);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read(path)?))
    }

    fn remove(&mut self, product_id: &str) -> Result<(), StoreError> {
        let path = self.entry_path(product_id);
        if path.is_file() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Owns the store for one editing session's lifetime: created when editing
/// starts, flushed per mutation, dropped when the session ends.
pub struct SessionAutosave {
    store: Box<dyn SessionStore>,
    product_id: String,
}

impl SessionAutosave {
    pub fn new(store: Box<dyn SessionStore>, product_id: impl Into<String>) -> Self {
        Self {
            store,
            product_id: product_id.into(),
        }
    }

    /// Flushes the current session. Fire-and-forget for the editor: a
    /// quota-exceeded result is information, not an abort.
    pub fn flush(&mut self, session: &DesignSession) -> Result<(), StoreError> {
        let payload = serialize_session(&self.product_id, session)?;
        self.store.put(&self.product_id, &payload)
    }

    /// Loads the previously saved session for this product, if any.
    pub fn load(&self) -> Result<Option<DesignSession>, StoreError> {
        match self.store.get(&self.product_id)? {
            Some(bytes) => Ok(Some(deserialize_session(&bytes)?.session)),
            None => Ok(None),
        }
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(&self.product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_gate_rejects_older_and_garbage_versions() {
        assert!(check_schema_version("1.0.0").is_ok());
        assert!(check_schema_version("2.3.1").is_ok());
        assert!(matches!(
            check_schema_version("0.9.0"),
            Err(StoreError::SchemaVersion { .. })
        ));
        assert!(matches!(
            check_schema_version("not-a-version"),
            Err(StoreError::SchemaVersion { .. })
        ));
    }

    #[test]
    fn memory_store_overwrites_per_product_id() {
        let mut store = MemoryStore::new(1024);
        store.put("p1", b"aaaa").unwrap();
        store.put("p1", b"bb").unwrap();
        assert_eq!(store.get("p1").unwrap().unwrap(), b"bb");
    }

    #[test]
    fn dir_store_one_file_per_product() {
        let root = tempfile::TempDir::new().unwrap();
        let mut store = DirStore::new(root.path());

        assert_eq!(store.get("p1").unwrap(), None);
        store.put("p1", b"first").unwrap();
        store.put("p1", b"second").unwrap();
        assert_eq!(store.get("p1").unwrap().unwrap(), b"second");
        assert!(root.path().join("p1.json").is_file());

        store.remove("p1").unwrap();
        assert_eq!(store.get("p1").unwrap(), None);
    }

    #[test]
    fn memory_store_quota() {
        let mut store = MemoryStore::new(4);
        assert!(matches!(
            store.put("p1", b"too large"),
            Err(StoreError::QuotaExceeded { attempted: 9 })
        ));
        // Overwriting an existing entry counts the old bytes as reclaimed.
        store.put("p1", b"abcd").unwrap();
        store.put("p1", b"dcba").unwrap();
    }
}
