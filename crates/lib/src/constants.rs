//! Constants used throughout the Satchel library.
//!
//! This module provides central definitions for reserved identifiers and
//! defaults shared by the store and backend layers.

/// Default length of generated document ids.
pub const DEFAULT_ID_LENGTH: usize = 7;

/// Prefix marking a document type as internal/system-reserved.
pub const INTERNAL_TYPE_PREFIX: char = '$';
