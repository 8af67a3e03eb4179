//! Change hooks for observing committed store mutations.
//!
//! This module provides the infrastructure for hooking into store write
//! operations to detect when documents are added, updated, or removed.
//! It is the seam a change feed or a remote-sync layer attaches to.

use std::sync::Arc;

use crate::Result;
use crate::document::Document;

/// The kind of mutation a change event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A document was written at a key with no prior live document.
    Add,
    /// A live document was overwritten or merged into.
    Update,
    /// A document left the live view (purged or tombstoned).
    Remove,
}

/// Context information passed to change hooks after a mutation persists.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// The kind of mutation
    pub kind: ChangeKind,
    /// The document as written (for `Remove`, as it was before deletion)
    pub document: Document,
}

/// Trait for implementing hooks that are called after store mutations.
///
/// Hooks observe committed state: the write has already been persisted when
/// a hook runs. Hook failures never roll back the write; they are logged
/// and otherwise ignored.
pub trait ChangeHook: Send + Sync {
    /// Called after a mutation has been persisted to the backend.
    ///
    /// # Arguments
    /// * `event` - The committed mutation and the document it concerns
    fn on_change(&self, event: &ChangeEvent) -> Result<()>;
}

/// A collection of change hooks that are executed together.
///
/// Hooks run in registration order. A failing hook does not stop the
/// remaining hooks from running.
#[derive(Default)]
pub struct ChangeHookCollection {
    hooks: Vec<Arc<dyn ChangeHook>>,
}

impl ChangeHookCollection {
    /// Create a new empty hook collection.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a change hook to the collection.
    pub fn add_hook(&mut self, hook: Arc<dyn ChangeHook>) {
        self.hooks.push(hook);
    }

    /// Execute all hooks with the given event.
    ///
    /// Failures are logged and swallowed; a committed write is never rolled
    /// back by an observer.
    pub fn dispatch(&self, event: &ChangeEvent) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_change(event) {
                tracing::error!(
                    "Change hook failed for {}/{}: {e}",
                    event.document.doc_type,
                    event.document.id
                );
            }
        }
    }

    /// Check if there are any hooks registered.
    pub fn has_hooks(&self) -> bool {
        !self.hooks.is_empty()
    }

    /// Get the number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
