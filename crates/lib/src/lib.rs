//!
//! Satchel: a local-first, type/id-addressed document store.
//! This library provides the store contract, its shared validation and
//! update logic, and a pluggable persistence layer.
//!
//! ## Core Concepts
//!
//! * **Documents (`document::Document`)**: Schema-free records addressed by a
//!   `(type, id)` pair. The two addressing fields are reserved; everything else
//!   is an arbitrary JSON attribute map.
//! * **Store (`store::Store`)**: The operation set: save, create, update,
//!   update_all, load, load_all, delete, delete_all (plus the destroy aliases).
//!   All operations are asynchronous and settle exactly once.
//! * **Backends (`backend::Backend`)**: A pluggable storage layer persisting
//!   `StoredDocument` envelopes. The envelope carries the `synced` and
//!   `deleted` flags that drive tombstone-vs-purge deletion.
//! * **Updates (`store::ObjectUpdate`)**: Partial updates as either an
//!   attribute map to merge or a transform computed against the current
//!   document. Updating a missing document creates it (upsert).
//! * **Change hooks (`store::ChangeHook`)**: Observers notified after a
//!   mutation persists, the seam a change feed or sync layer attaches to.

pub mod backend;
pub mod constants;
pub mod document;
pub mod store;

/// Re-export the primary types for easier access.
pub use backend::{Backend, InMemory, StoredDocument};
pub use document::{Document, DocumentKey};
pub use store::{ObjectUpdate, Store, StoreOptions};

/// Result type used throughout the Satchel library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Satchel library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured data-model errors from the document module
    #[error(transparent)]
    Document(document::DocumentError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured backend errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Document(_) => "document",
            Error::Store(_) => "store",
            Error::Backend(_) => "backend",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a document was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a type or id failed its pattern check.
    pub fn is_invalid_key(&self) -> bool {
        match self {
            Error::Document(document_err) => document_err.is_invalid_key(),
            _ => false,
        }
    }

    /// Check if this error indicates a missing or wrongly-shaped argument.
    pub fn is_invalid_arguments(&self) -> bool {
        match self {
            Error::Document(document_err) => document_err.is_invalid_arguments(),
            Error::Store(store_err) => store_err.is_invalid_arguments(),
            _ => false,
        }
    }

    /// Check if this error is validation-related (invalid key or arguments).
    pub fn is_validation_error(&self) -> bool {
        self.is_invalid_key() || self.is_invalid_arguments()
    }

    /// Check if this error is backend-related.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is a serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Backend(backend_err) => backend_err.is_serialization_error(),
            _ => false,
        }
    }
}
