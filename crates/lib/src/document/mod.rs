//! Document data model for Satchel.
//!
//! A document is a schema-free JSON record addressed by a `(type, id)` pair.
//! The two addressing fields are reserved; everything else is an arbitrary
//! attribute map. This module owns the data model, the identifier validation
//! rules, and the attribute-merge logic shared by the store's update path.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod errors;
pub use errors::DocumentError;

mod validation;
pub use validation::{validate_id, validate_type};

/// Reserved attribute name carrying the document type.
pub const TYPE_FIELD: &str = "type";

/// Reserved attribute name carrying the document id.
pub const ID_FIELD: &str = "id";

/// A type/id-addressed, schema-free record held by the store.
///
/// Serializes to a flat JSON object: the addressing fields appear as `type`
/// and `id` alongside the attributes. The store is the sole writer of
/// persisted document state; callers only propose changes through the
/// operation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document category. Must match `[a-z$][a-z0-9]+`.
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Unique within a type. Must match `[a-z0-9-]+`.
    pub id: String,
    /// Schema-free attributes.
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl Document {
    /// Creates a document from its parts.
    ///
    /// Reserved `type`/`id` keys inside `attrs` are dropped; the addressing
    /// fields always come from the explicit arguments.
    pub fn new(
        doc_type: impl Into<String>,
        id: impl Into<String>,
        mut attrs: Map<String, Value>,
    ) -> Self {
        attrs.remove(TYPE_FIELD);
        attrs.remove(ID_FIELD);
        Self {
            doc_type: doc_type.into(),
            id: id.into(),
            attrs,
        }
    }

    /// Builds a document from a JSON value, which must be an object.
    ///
    /// # Errors
    /// Returns `DocumentError::NotAnObject` when `object` is null, an array,
    /// or a primitive.
    pub fn from_object(
        doc_type: impl Into<String>,
        id: impl Into<String>,
        object: Value,
    ) -> std::result::Result<Self, DocumentError> {
        match object {
            Value::Object(attrs) => Ok(Self::new(doc_type, id, attrs)),
            other => Err(DocumentError::NotAnObject {
                actual: json_type_name(&other),
            }),
        }
    }

    /// Returns the `(type, id)` key addressing this document.
    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(&self.doc_type, &self.id)
    }

    /// Returns an attribute value.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Value> {
        self.attrs.get(key.as_ref())
    }

    /// Returns the value a patch key is compared against.
    ///
    /// The reserved `type`/`id` keys resolve to the addressing fields,
    /// everything else to the attribute of that name. This is the lookup the
    /// update path uses for its changed-key detection.
    pub fn value_of(&self, key: &str) -> Option<Value> {
        match key {
            TYPE_FIELD => Some(Value::String(self.doc_type.clone())),
            ID_FIELD => Some(Value::String(self.id.clone())),
            _ => self.attrs.get(key).cloned(),
        }
    }

    /// Merges a patch into the attributes.
    ///
    /// Every non-reserved key is applied, replacing any existing value.
    /// Reserved `type`/`id` keys never overwrite the addressing fields; the
    /// store re-stamps those from the operation arguments on save.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            if key == TYPE_FIELD || key == ID_FIELD {
                continue;
            }
            self.attrs.insert(key.clone(), value.clone());
        }
    }

    /// Serializes the document to its flat JSON object form.
    pub fn to_value(&self) -> Value {
        // Serialization of a flat struct with a flattened map cannot fail.
        serde_json::to_value(self).expect("document serializes to an object")
    }
}

/// Uniquely addresses a document within a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey {
    /// The document category.
    pub doc_type: String,
    /// The id, unique within the type.
    pub id: String,
}

impl DocumentKey {
    /// Creates a key from its parts.
    pub fn new(doc_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.doc_type, self.id)
    }
}

/// Human-readable name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
