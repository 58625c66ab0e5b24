//! CMS collection and field metadata.
//!
//! These types describe the schema of the content-management system as the
//! pipeline sees it. They are read-only: the pipeline inspects them to decide
//! what to index but never writes them back.

use serde::{Deserialize, Serialize};

/// A named content type in the CMS (e.g. `post`, `pages`, `speaking`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// The collection name, used verbatim as the CMS table identifier.
    pub name: String,
    /// Free-form note attached to the collection in the CMS admin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Hidden collections are never discovered for indexing.
    #[serde(default)]
    pub hidden: bool,
}

impl Collection {
    /// Create a visible collection with no note.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            note: None,
            hidden: false,
        }
    }
}

/// Declared storage type of a CMS field.
///
/// Only the types that influence classification get their own variant;
/// everything else is kept verbatim in [`FieldType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Text,
    Uuid,
    Hash,
    Json,
    Boolean,
    Integer,
    Float,
    Decimal,
    Other(String),
}

impl FieldType {
    /// The CMS spelling of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Uuid => "uuid",
            Self::Hash => "hash",
            Self::Json => "json",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for FieldType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "string" => Self::String,
            "text" => Self::Text,
            "uuid" => Self::Uuid,
            "hash" => Self::Hash,
            "json" => Self::Json,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "decimal" => Self::Decimal,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for FieldType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

/// Metadata for a single field of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as it appears in records.
    pub name: String,
    /// Declared storage type.
    pub field_type: FieldType,
    /// Hidden fields are never searchable or facetable.
    #[serde(default)]
    pub hidden: bool,
}

impl FieldDescriptor {
    /// Create a visible field descriptor.
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            hidden: false,
        }
    }

    /// Create a hidden field descriptor.
    pub fn hidden(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            hidden: true,
            ..Self::new(name, field_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_from_known_and_unknown() {
        assert_eq!(FieldType::from("text"), FieldType::Text);
        assert_eq!(FieldType::from("decimal"), FieldType::Decimal);
        assert_eq!(
            FieldType::from("timestamp"),
            FieldType::Other("timestamp".to_string())
        );
    }

    #[test]
    fn test_field_type_serde_uses_cms_spelling() {
        let json = serde_json::to_string(&FieldType::Uuid).unwrap();
        assert_eq!(json, "\"uuid\"");

        let parsed: FieldType = serde_json::from_str("\"dateTime\"").unwrap();
        assert_eq!(parsed, FieldType::Other("dateTime".to_string()));
        assert_eq!(parsed.as_str(), "dateTime");
    }

    #[test]
    fn test_hidden_descriptor() {
        let field = FieldDescriptor::hidden("sort", "integer");
        assert!(field.hidden);
        assert_eq!(field.field_type, FieldType::Integer);
    }
}
