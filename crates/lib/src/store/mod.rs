//! Store operations over a pluggable backend.
//!
//! [`Store`] implements the document-store contract: save, create, update
//! (partial and bulk), load, load-all, delete, and delete-all, with the
//! shared validation and update-diffing logic every backend gets for free.
//! The store owns the write path; backends only persist
//! [`StoredDocument`](crate::backend::StoredDocument) envelopes.
//!
//! All operations are asynchronous, settle exactly once, and never partially
//! apply state on validation failure.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::task::JoinSet;

use crate::Result;
use crate::backend::{Backend, BackendError, StoredDocument};
use crate::document::{self, Document, DocumentKey};

mod errors;
pub use errors::StoreError;

mod hooks;
pub use hooks::{ChangeEvent, ChangeHook, ChangeHookCollection, ChangeKind};

mod id;
pub use id::uuid;

/// Options accepted by every mutating store operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Suppress change-hook dispatch for this operation.
    pub silent: bool,
}

impl StoreOptions {
    /// Options that suppress change-hook dispatch.
    pub fn silent() -> Self {
        Self { silent: true }
    }
}

/// A partial update applied by [`Store::update`] and [`Store::update_all`].
///
/// Either a mapping of attributes to merge into the current document, or a
/// transform computing that mapping from the current document. A transform
/// returning `None` means "no change".
#[derive(Clone)]
pub enum ObjectUpdate {
    /// Merge the given attributes into the current document.
    Merge(Map<String, Value>),
    /// Compute the attributes to merge from the current document.
    Transform(Arc<dyn Fn(&Document) -> Option<Map<String, Value>> + Send + Sync>),
}

impl ObjectUpdate {
    /// An update merging the given attributes.
    pub fn merge(attrs: Map<String, Value>) -> Self {
        ObjectUpdate::Merge(attrs)
    }

    /// An update computing its attributes from the current document.
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&Document) -> Option<Map<String, Value>> + Send + Sync + 'static,
    {
        ObjectUpdate::Transform(Arc::new(f))
    }

    /// The attributes to merge into `current`, or `None` for "no change".
    fn patch_for(&self, current: &Document) -> Option<Map<String, Value>> {
        match self {
            ObjectUpdate::Merge(attrs) => Some(attrs.clone()),
            ObjectUpdate::Transform(f) => f(current),
        }
    }
}

impl fmt::Debug for ObjectUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectUpdate::Merge(attrs) => f.debug_tuple("Merge").field(attrs).finish(),
            ObjectUpdate::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

impl From<Map<String, Value>> for ObjectUpdate {
    fn from(attrs: Map<String, Value>) -> Self {
        ObjectUpdate::Merge(attrs)
    }
}

/// The documents a bulk update applies to.
///
/// [`Store::update_all`] normalizes its target: a type name loads every live
/// document of that type, an explicit collection is used directly, and
/// [`UpdateTarget::All`] loads the whole store.
#[derive(Debug, Clone)]
pub enum UpdateTarget {
    /// Every live document in the store.
    All,
    /// Every live document of one type.
    Type(String),
    /// An explicit ordered collection of documents.
    Documents(Vec<Document>),
}

impl From<&str> for UpdateTarget {
    fn from(doc_type: &str) -> Self {
        UpdateTarget::Type(doc_type.to_string())
    }
}

impl From<String> for UpdateTarget {
    fn from(doc_type: String) -> Self {
        UpdateTarget::Type(doc_type)
    }
}

impl From<Vec<Document>> for UpdateTarget {
    fn from(documents: Vec<Document>) -> Self {
        UpdateTarget::Documents(documents)
    }
}

/// Filter applied by [`Store::load_all`].
#[derive(Clone)]
pub enum DocumentFilter {
    /// Every live document.
    All,
    /// Live documents of one type.
    Type(String),
    /// Live documents matching a predicate.
    Predicate(Arc<dyn Fn(&Document) -> bool + Send + Sync>),
}

impl DocumentFilter {
    /// A filter keeping documents the predicate accepts.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Document) -> bool + Send + Sync + 'static,
    {
        DocumentFilter::Predicate(Arc::new(f))
    }
}

impl fmt::Debug for DocumentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFilter::All => f.write_str("All"),
            DocumentFilter::Type(doc_type) => f.debug_tuple("Type").field(doc_type).finish(),
            DocumentFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for DocumentFilter {
    fn from(doc_type: &str) -> Self {
        DocumentFilter::Type(doc_type.to_string())
    }
}

impl From<String> for DocumentFilter {
    fn from(doc_type: String) -> Self {
        DocumentFilter::Type(doc_type)
    }
}

/// The document-store front end.
///
/// A `Store` is a cheaply cloneable handle over an injected backend plus a
/// set of change hooks. It carries no document state of its own; the
/// backend's table is the single write path, and callers only propose
/// changes through the operation set.
///
/// The contract does not serialize operations on the same key; callers
/// wanting issuance-order effects on one key must await each operation
/// before issuing the next.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn Backend>,
    hooks: Arc<ChangeHookCollection>,
}

impl Store {
    /// Creates a store over the given backend, with no hooks.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            hooks: Arc::new(ChangeHookCollection::new()),
        }
    }

    /// Creates a store over the given backend with a hook collection.
    pub fn with_hooks(backend: Arc<dyn Backend>, hooks: ChangeHookCollection) -> Self {
        Self {
            backend,
            hooks: Arc::new(hooks),
        }
    }

    /// Saves a document, overwriting any prior document at the same key.
    ///
    /// This is a full replacement, not a merge. Reserved `type`/`id` keys
    /// inside `object` are dropped and re-stamped from the arguments.
    ///
    /// # Arguments
    /// * `doc_type` - Document category, must match `[a-z$][a-z0-9]+`
    /// * `id` - Document id, must match `[a-z0-9-]+`; `None` or empty
    ///   generates a fresh 7-character id
    /// * `object` - The document body, must be a JSON object
    /// * `options` - Operation options
    ///
    /// # Returns
    /// The persisted document, including its assigned `type` and `id`.
    ///
    /// # Errors
    /// Fails with INVALID_ARGUMENTS when `object` is not an object and with
    /// INVALID_KEY when `doc_type` or a supplied `id` fails its pattern
    /// check. Nothing is written on a validation failure.
    pub async fn save(
        &self,
        doc_type: &str,
        id: Option<&str>,
        object: Value,
        options: &StoreOptions,
    ) -> Result<Document> {
        document::validate_type(doc_type)?;
        let id = match id {
            Some(id) if !id.is_empty() => {
                document::validate_id(id)?;
                id.to_string()
            }
            _ => id::generate_id(),
        };
        let document = Document::from_object(doc_type, id, object)?;
        self.write(document, options).await
    }

    /// Saves a new document under a generated id.
    ///
    /// Pure convenience: delegates to [`save`](Self::save) with no id.
    pub async fn create(
        &self,
        doc_type: &str,
        object: Value,
        options: &StoreOptions,
    ) -> Result<Document> {
        self.save(doc_type, None, object, options).await
    }

    /// Applies a partial update to the document at `(doc_type, id)`.
    ///
    /// The current document is loaded and the update's attributes are merged
    /// into it: all proposed keys are applied, but a write only happens
    /// when at least one proposed value differs from the current one. A
    /// transform returning `None`, an empty patch, or an all-identical patch
    /// resolve with the current document and write nothing.
    ///
    /// If no document exists at the key, a [`ObjectUpdate::Merge`] update is
    /// taken as the initial object and saved there (upsert). A transform
    /// cannot upsert, as there is no document to compute from.
    ///
    /// # Errors
    /// Propagates the underlying save's errors when a write is attempted;
    /// fails with INVALID_ARGUMENTS for a transform of a missing document.
    pub async fn update(
        &self,
        doc_type: &str,
        id: &str,
        update: ObjectUpdate,
        options: &StoreOptions,
    ) -> Result<Document> {
        let current = match self.load(doc_type, id).await {
            Ok(document) => document,
            Err(e) if e.is_not_found() => {
                return match update {
                    ObjectUpdate::Merge(attrs) => {
                        self.save(doc_type, Some(id), Value::Object(attrs), options)
                            .await
                    }
                    ObjectUpdate::Transform(_) => Err(StoreError::InvalidArguments {
                        operation: "update",
                        reason: format!(
                            "cannot apply a transform to missing document '{doc_type}/{id}'"
                        ),
                    }
                    .into()),
                };
            }
            Err(e) => return Err(e),
        };

        let Some(patch) = update.patch_for(&current) else {
            return Ok(current);
        };
        if patch.is_empty() {
            return Ok(current);
        }

        // Merge always applies every proposed key; only a strict value
        // difference makes the operation persist.
        let changed = patch
            .iter()
            .any(|(key, value)| current.value_of(key).as_ref() != Some(value));
        if !changed {
            tracing::debug!("update of {}/{} changed nothing, skipping write", doc_type, id);
            return Ok(current);
        }

        let mut merged = current;
        merged.merge(&patch);
        self.write(merged, options).await
    }

    /// Applies one update to a collection of documents concurrently.
    ///
    /// The target is normalized first: a type name or [`UpdateTarget::All`]
    /// loads the matching live documents, an explicit collection is used
    /// directly. Each sub-update runs to completion regardless of sibling
    /// failures; the aggregate resolves with the updated documents in
    /// target order only when every sub-update succeeded, and fails with
    /// the first error otherwise.
    pub async fn update_all(
        &self,
        target: impl Into<UpdateTarget>,
        update: ObjectUpdate,
        options: &StoreOptions,
    ) -> Result<Vec<Document>> {
        let documents = match target.into() {
            UpdateTarget::All => self.load_all(DocumentFilter::All).await?,
            UpdateTarget::Type(doc_type) => self.load_all(DocumentFilter::Type(doc_type)).await?,
            UpdateTarget::Documents(documents) => documents,
        };

        let count = documents.len();
        let mut set = JoinSet::new();
        for (index, document) in documents.into_iter().enumerate() {
            let store = self.clone();
            let update = update.clone();
            let options = *options;
            set.spawn(async move {
                let result = store
                    .update(&document.doc_type, &document.id, update, &options)
                    .await;
                (index, result)
            });
        }

        let mut updated: Vec<Option<Document>> = vec![None; count];
        let mut first_err = None;
        while let Some(join_result) = set.join_next().await {
            match join_result {
                Ok((index, Ok(document))) => updated[index] = Some(document),
                Ok((_, Err(e))) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(
                            StoreError::BulkTaskFailed {
                                reason: e.to_string(),
                            }
                            .into(),
                        );
                    }
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(updated.into_iter().flatten().collect()),
        }
    }

    /// Loads the live document at `(doc_type, id)`.
    ///
    /// # Errors
    /// Fails with INVALID_ARGUMENTS when either argument is empty, and with
    /// the backend's not-found signal when no live document exists at the
    /// key (tombstones are absent from the live view).
    pub async fn load(&self, doc_type: &str, id: &str) -> Result<Document> {
        let key = require_key("load", doc_type, id)?;
        let stored = self.backend.get(&key).await?;
        if !stored.is_live() {
            return Err(not_found(&key));
        }
        Ok(stored.document)
    }

    /// Loads all live documents, optionally filtered.
    ///
    /// # Returns
    /// The matching documents ordered by `(type, id)`.
    pub async fn load_all(&self, filter: impl Into<DocumentFilter>) -> Result<Vec<Document>> {
        let filter = filter.into();
        let doc_type = match &filter {
            DocumentFilter::Type(doc_type) => Some(doc_type.as_str()),
            _ => None,
        };
        let stored = self.backend.list(doc_type).await?;
        let mut documents: Vec<Document> = stored
            .into_iter()
            .filter(StoredDocument::is_live)
            .map(|stored| stored.document)
            .collect();
        if let DocumentFilter::Predicate(predicate) = &filter {
            documents.retain(|document| predicate(document));
        }
        Ok(documents)
    }

    /// Deletes the live document at `(doc_type, id)`.
    ///
    /// A document that has been synchronized to a remote counterpart is
    /// retained as a tombstone so the deletion can propagate; an unsynced
    /// document is purged outright. Either way it leaves the live view.
    ///
    /// # Returns
    /// The document as it was before deletion.
    ///
    /// # Errors
    /// Fails with INVALID_ARGUMENTS when either argument is empty, and with
    /// the backend's not-found signal when no live document exists.
    pub async fn delete(
        &self,
        doc_type: &str,
        id: &str,
        options: &StoreOptions,
    ) -> Result<Document> {
        let key = require_key("delete", doc_type, id)?;
        let stored = self.backend.get(&key).await?;
        if !stored.is_live() {
            return Err(not_found(&key));
        }

        let document = stored.document.clone();
        if stored.synced {
            tracing::debug!("tombstoning synced document {key}");
            self.backend.put(stored.into_tombstone()).await?;
        } else {
            tracing::debug!("purging document {key}");
            self.backend.remove(&key).await?;
        }

        if !options.silent {
            self.hooks.dispatch(&ChangeEvent {
                kind: ChangeKind::Remove,
                document: document.clone(),
            });
        }
        Ok(document)
    }

    /// Alias for [`delete`](Self::delete) with identical argument forwarding.
    pub async fn destroy(
        &self,
        doc_type: &str,
        id: &str,
        options: &StoreOptions,
    ) -> Result<Document> {
        self.delete(doc_type, id, options).await
    }

    /// Deletes every live document, optionally scoped to one type.
    ///
    /// The tombstone-vs-purge policy of [`delete`](Self::delete) applies
    /// per document.
    ///
    /// # Returns
    /// The deleted documents in `(type, id)` order.
    pub async fn delete_all(
        &self,
        doc_type: Option<&str>,
        options: &StoreOptions,
    ) -> Result<Vec<Document>> {
        let stored = self.backend.list(doc_type).await?;
        let mut deleted = Vec::new();
        for stored in stored.into_iter().filter(StoredDocument::is_live) {
            let key = stored.key();
            let document = stored.document.clone();
            if stored.synced {
                self.backend.put(stored.into_tombstone()).await?;
            } else {
                self.backend.remove(&key).await?;
            }
            if !options.silent {
                self.hooks.dispatch(&ChangeEvent {
                    kind: ChangeKind::Remove,
                    document: document.clone(),
                });
            }
            deleted.push(document);
        }
        tracing::debug!(
            "deleted {} document(s){}",
            deleted.len(),
            doc_type.map(|t| format!(" of type '{t}'")).unwrap_or_default()
        );
        Ok(deleted)
    }

    /// Alias for [`delete_all`](Self::delete_all) with identical argument
    /// forwarding.
    pub async fn destroy_all(
        &self,
        doc_type: Option<&str>,
        options: &StoreOptions,
    ) -> Result<Vec<Document>> {
        self.delete_all(doc_type, options).await
    }

    /// The single write path: persists a document and dispatches the
    /// matching change event.
    async fn write(&self, document: Document, options: &StoreOptions) -> Result<Document> {
        let key = document.key();
        let prior = match self.backend.get(&key).await {
            Ok(stored) => Some(stored),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        let kind = if prior.as_ref().is_some_and(StoredDocument::is_live) {
            ChangeKind::Update
        } else {
            ChangeKind::Add
        };

        let stored = StoredDocument::replacing(document.clone(), prior.as_ref());
        self.backend.put(stored).await?;
        tracing::debug!("wrote document {key} ({kind:?})");

        if !options.silent {
            self.hooks.dispatch(&ChangeEvent {
                kind,
                document: document.clone(),
            });
        }
        Ok(document)
    }
}

fn require_key(operation: &'static str, doc_type: &str, id: &str) -> Result<DocumentKey> {
    if doc_type.is_empty() {
        return Err(StoreError::InvalidArguments {
            operation,
            reason: "type must be a non-empty string".to_string(),
        }
        .into());
    }
    if id.is_empty() {
        return Err(StoreError::InvalidArguments {
            operation,
            reason: "id must be a non-empty string".to_string(),
        }
        .into());
    }
    Ok(DocumentKey::new(doc_type, id))
}

fn not_found(key: &DocumentKey) -> crate::Error {
    BackendError::DocumentNotFound {
        doc_type: key.doc_type.clone(),
        id: key.id.clone(),
    }
    .into()
}
