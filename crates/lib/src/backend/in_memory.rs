//! In-memory backend implementation.
//!
//! This module provides an in-memory implementation of the Backend trait,
//! suitable for testing, development, or scenarios where data persistence
//! is not strictly required or is handled externally (e.g., by saving and
//! loading the entire table to/from a file).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::{Backend, BackendError, StoredDocument};
use crate::document::DocumentKey;

use async_trait::async_trait;

/// The current snapshot file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const SNAPSHOT_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the snapshot version during deserialization.
fn validate_snapshot_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != SNAPSHOT_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported snapshot version {version}; only version {SNAPSHOT_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// Serializable snapshot of the document table for persistence.
///
/// Envelopes are stored as a flat list; the table is rebuilt from each
/// envelope's own key on load.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_snapshot_version"
    )]
    version: u8,
    documents: Vec<StoredDocument>,
}

/// A simple in-memory backend keeping the document table in a `BTreeMap`.
///
/// The ordered map gives `list` its `(type, id)` ordering structurally.
/// Individual operations are linearized through a read-write lock; the
/// backend does not serialize read-modify-write sequences spanning several
/// calls; that is the caller's concern, as the store contract documents.
///
/// Basic persistence is available via [`save_to_file`](Self::save_to_file)
/// and [`load_from_file`](Self::load_from_file), serializing the table to
/// JSON. Suitable for a single-user local store.
#[derive(Debug, Default)]
pub struct InMemory {
    documents: RwLock<BTreeMap<DocumentKey, StoredDocument>>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` backend.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the keys of all stored envelopes, tombstones included.
    pub async fn all_keys(&self) -> Vec<DocumentKey> {
        let documents = self.documents.read().await;
        documents.keys().cloned().collect()
    }

    /// Returns the number of stored envelopes, tombstones included.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the table holds no envelopes at all.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Saves the entire table (tombstones and sync flags included) to a
    /// file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the snapshot should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let snapshot = {
            let documents = self.documents.read().await;
            Snapshot {
                version: SNAPSHOT_VERSION,
                documents: documents.values().cloned().collect(),
            }
        };
        let json = serde_json::to_string(&snapshot)
            .map_err(|e| BackendError::SerializationFailed { source: e })?;
        std::fs::write(path.as_ref(), json).map_err(|e| BackendError::FileIo { source: e })?;
        Ok(())
    }

    /// Loads a table snapshot from a JSON file.
    ///
    /// If the file does not exist, a new, empty backend is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the snapshot.
    ///
    /// # Returns
    /// A `Result` containing the loaded backend or an I/O or
    /// deserialization error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path).map_err(|e| BackendError::FileIo { source: e })?;
        let snapshot: Snapshot = serde_json::from_str(&json)
            .map_err(|e| BackendError::DeserializationFailed { source: e })?;
        let table = snapshot
            .documents
            .into_iter()
            .map(|stored| (stored.key(), stored))
            .collect();
        Ok(Self {
            documents: RwLock::new(table),
        })
    }
}

#[async_trait]
impl Backend for InMemory {
    async fn get(&self, key: &DocumentKey) -> Result<StoredDocument> {
        let documents = self.documents.read().await;
        documents.get(key).cloned().ok_or_else(|| {
            BackendError::DocumentNotFound {
                doc_type: key.doc_type.clone(),
                id: key.id.clone(),
            }
            .into()
        })
    }

    async fn put(&self, stored: StoredDocument) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert(stored.key(), stored);
        Ok(())
    }

    async fn remove(&self, key: &DocumentKey) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.remove(key);
        Ok(())
    }

    async fn list(&self, doc_type: Option<&str>) -> Result<Vec<StoredDocument>> {
        let documents = self.documents.read().await;
        let listed = match doc_type {
            // Key ordering is (type, id), so a type scope is a contiguous range.
            Some(doc_type) => documents
                .values()
                .filter(|stored| stored.document.doc_type == doc_type)
                .cloned()
                .collect(),
            None => documents.values().cloned().collect(),
        };
        Ok(listed)
    }

    async fn mark_synced(&self, key: &DocumentKey) -> Result<()> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(key) {
            Some(stored) => {
                stored.synced = true;
                Ok(())
            }
            None => Err(BackendError::DocumentNotFound {
                doc_type: key.doc_type.clone(),
                id: key.id.clone(),
            }
            .into()),
        }
    }
}
