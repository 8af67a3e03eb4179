//! Identifier validation for document types and ids.
//!
//! Two fixed patterns, checked on every operation that receives an explicit
//! identifier:
//!
//! - type: `[a-z$][a-z0-9]+`: a lowercase letter or `$` (internal types),
//!   followed by one or more lowercase letters or digits.
//! - id: `[a-z0-9-]+`: lowercase letters, digits, and dashes.

use crate::constants::INTERNAL_TYPE_PREFIX;

use super::errors::DocumentError;

/// Checks a type identifier against `[a-z$][a-z0-9]+`.
///
/// # Errors
/// Returns `DocumentError::InvalidType` carrying the offending value.
pub fn validate_type(doc_type: &str) -> std::result::Result<(), DocumentError> {
    if is_valid_type(doc_type) {
        Ok(())
    } else {
        Err(DocumentError::InvalidType {
            value: doc_type.to_string(),
        })
    }
}

/// Checks an id identifier against `[a-z0-9-]+`.
///
/// # Errors
/// Returns `DocumentError::InvalidId` carrying the offending value.
pub fn validate_id(id: &str) -> std::result::Result<(), DocumentError> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(DocumentError::InvalidId {
            value: id.to_string(),
        })
    }
}

fn is_valid_type(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_lowercase() && first != INTERNAL_TYPE_PREFIX {
        return false;
    }
    // The pattern requires at least one character after the first.
    let mut has_rest = false;
    for c in chars {
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() {
            return false;
        }
        has_rest = true;
    }
    has_rest
}

fn is_valid_id(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
