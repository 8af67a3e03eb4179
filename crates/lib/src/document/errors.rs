//! Structured error types for the document data model.
//!
//! These are the validation failures of the store contract: identifier
//! pattern violations (INVALID_KEY) and wrongly-shaped document bodies
//! (INVALID_ARGUMENTS), surfaced before any backend call.

use thiserror::Error;

/// Errors raised by document construction and identifier validation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A type identifier failed its pattern check.
    #[error("Invalid type '{value}': must match [a-z$][a-z0-9]+")]
    InvalidType {
        /// The offending value
        value: String,
    },

    /// An id identifier failed its pattern check.
    #[error("Invalid id '{value}': must match [a-z0-9-]+")]
    InvalidId {
        /// The offending value
        value: String,
    },

    /// A document body must be a JSON object.
    #[error("Invalid document body: expected an object, got {actual}")]
    NotAnObject {
        /// What was passed instead
        actual: &'static str,
    },
}

impl DocumentError {
    /// Check if this error is an identifier pattern violation.
    pub fn is_invalid_key(&self) -> bool {
        matches!(
            self,
            DocumentError::InvalidType { .. } | DocumentError::InvalidId { .. }
        )
    }

    /// Check if this error is a wrongly-shaped argument.
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(self, DocumentError::NotAnObject { .. })
    }

    /// Get the field an identifier violation refers to.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DocumentError::InvalidType { .. } => Some("type"),
            DocumentError::InvalidId { .. } => Some("id"),
            _ => None,
        }
    }

    /// Get the offending value of an identifier violation.
    pub fn value(&self) -> Option<&str> {
        match self {
            DocumentError::InvalidType { value } | DocumentError::InvalidId { value } => {
                Some(value)
            }
            _ => None,
        }
    }
}

// Conversion to the main Error type
impl From<DocumentError> for crate::Error {
    fn from(err: DocumentError) -> Self {
        crate::Error::Document(err)
    }
}
