//! Backend implementations for Satchel storage.
//!
//! This module provides the `Backend` trait and its implementations. The
//! trait defines the interface for persisting `StoredDocument` envelopes,
//! which allows the store's shared logic (validation, update diffing,
//! deletion policy) to be independent of the specific storage mechanism.
//!
//! Backends are deliberately dumb: they store, retrieve, and enumerate
//! envelopes by key, tombstones included. The live-view filtering and the
//! tombstone-vs-purge branch live in [`crate::store::Store`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::document::{Document, DocumentKey};

mod errors;
pub use errors::BackendError;

mod in_memory;
pub use in_memory::InMemory;

/// Persistence envelope pairing a document with its storage flags.
///
/// The flags are the branch point the deletion policy requires: a document
/// that has been pushed to a remote counterpart (`synced`) is retained as a
/// tombstone (`deleted`) on delete so the deletion can propagate, while an
/// unsynced document is purged outright. Who sets `synced` and when is a
/// sync layer's business, outside this crate's scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// The document itself. Attributes are retained even on tombstones.
    pub document: Document,
    /// The document has been synchronized to a remote counterpart at least once.
    #[serde(default)]
    pub synced: bool,
    /// Tombstone marker. Tombstoned documents are invisible to the live view.
    #[serde(default)]
    pub deleted: bool,
}

impl StoredDocument {
    /// Envelope for a freshly written document: not synced, not deleted.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            synced: false,
            deleted: false,
        }
    }

    /// Envelope for a document replacing `prior` at the same key.
    ///
    /// The `synced` flag is carried forward: the remote counterpart already
    /// knows the key, so a later delete must still leave a tombstone. Any
    /// prior tombstone is cleared: a save revives the key.
    pub fn replacing(document: Document, prior: Option<&StoredDocument>) -> Self {
        Self {
            document,
            synced: prior.is_some_and(|p| p.synced),
            deleted: false,
        }
    }

    /// Turns this envelope into a tombstone.
    pub fn into_tombstone(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// Whether this envelope is visible to the live view.
    pub fn is_live(&self) -> bool {
        !self.deleted
    }

    /// The `(type, id)` key this envelope is stored under.
    pub fn key(&self) -> DocumentKey {
        self.document.key()
    }
}

/// Backend trait abstracting the underlying storage mechanism.
///
/// Implementations handle the specifics of how envelopes are persisted
/// (in memory, on disk, in a remote database). All backends must be `Send`
/// and `Sync` to allow sharing across tasks.
///
/// The only contract-level signal a backend defines is "not found"
/// ([`BackendError::DocumentNotFound`]); it must be distinguishable from
/// success and from other failures.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Retrieves the stored envelope at `key`, tombstones included.
    ///
    /// # Errors
    /// Returns `BackendError::DocumentNotFound` when nothing is stored at
    /// the key. Returns an owned copy to support concurrent access with
    /// internal synchronization.
    async fn get(&self, key: &DocumentKey) -> Result<StoredDocument>;

    /// Stores an envelope under its own key, replacing any prior envelope.
    async fn put(&self, stored: StoredDocument) -> Result<()>;

    /// Purges the envelope at `key` outright, tombstone or not.
    ///
    /// Succeeds even if nothing is stored at the key.
    async fn remove(&self, key: &DocumentKey) -> Result<()>;

    /// Enumerates stored envelopes, optionally scoped to one type,
    /// tombstones included, ordered by `(type, id)`.
    async fn list(&self, doc_type: Option<&str>) -> Result<Vec<StoredDocument>>;

    /// Marks the envelope at `key` as synchronized to a remote counterpart.
    ///
    /// This is the hook a sync layer drives after pushing a document.
    ///
    /// # Errors
    /// Returns `BackendError::DocumentNotFound` when nothing is stored at
    /// the key.
    async fn mark_synced(&self, key: &DocumentKey) -> Result<()>;
}
