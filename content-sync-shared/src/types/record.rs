//! Untyped CMS records.
//!
//! Collections are discovered at runtime, so records are kept as a
//! string-keyed JSON map rather than a per-collection struct.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The literal status value that marks a record as publicly visible.
pub const PUBLISHED_STATUS: &str = "published";

/// Primary key of a record. The CMS uses integer keys for most collections
/// and string (usually UUID) keys for the rest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// Read a key from a JSON value. Floats, booleans, arrays and objects are
    /// not valid keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) if !s.is_empty() => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{}", id),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

/// A single content item belonging to one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a record from a JSON value. Returns `None` unless the value is an
    /// object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// The record's primary key, if present and well-formed.
    pub fn id(&self) -> Option<RecordId> {
        self.fields.get("id").and_then(RecordId::from_value)
    }

    /// The raw `status` value. A JSON `null` status counts as absent.
    pub fn status(&self) -> Option<&Value> {
        self.fields.get("status").filter(|v| !v.is_null())
    }

    /// Publication policy: a record is publishable unless it carries a status
    /// that is anything other than `"published"`.
    pub fn is_published(&self) -> bool {
        match self.status() {
            None => true,
            Some(Value::String(status)) => status == PUBLISHED_STATUS,
            Some(_) => false,
        }
    }

    /// Field value by name. `Some(Value::Null)` means the field is present
    /// but empty.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }
}
