//! Structured error types for store operations.
//!
//! Identifier pattern violations live in
//! [`DocumentError`](crate::document::DocumentError); this module covers the
//! failures the store detects itself.

use thiserror::Error;

/// Errors raised by the store's shared operation logic.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required argument is missing or of the wrong shape.
    #[error("Invalid arguments for {operation}: {reason}")]
    InvalidArguments {
        /// The operation that rejected its arguments
        operation: &'static str,
        /// What was wrong with them
        reason: String,
    },

    /// A bulk sub-operation task failed to complete.
    ///
    /// This signals a panicked or cancelled task, not a failed update;
    /// failed updates surface their own error.
    #[error("Bulk operation task failed: {reason}")]
    BulkTaskFailed {
        /// Description of the task failure
        reason: String,
    },
}

impl StoreError {
    /// Check if this error is a missing or wrongly-shaped argument.
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(self, StoreError::InvalidArguments { .. })
    }

    /// Get the operation name if this is an argument error.
    pub fn operation(&self) -> Option<&str> {
        match self {
            StoreError::InvalidArguments { operation, .. } => Some(operation),
            _ => None,
        }
    }
}

// Conversion to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
