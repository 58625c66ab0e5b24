//! Search document types for the hosted index.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::record::RecordId;

/// Document representation stored in the search index.
///
/// `object_id` is always `{collection}_{record id}`: unique per source record
/// and stable across re-indexing, so repeated saves overwrite instead of
/// duplicating. `collection` lets several source collections share one index
/// and is what bulk cleanup filters on.
///
/// Attributes are kept in a sorted map, which makes the serialized form of a
/// document a pure function of its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub collection: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl SearchDocument {
    /// Attribute names that are owned by the document envelope and cannot be
    /// overwritten by record fields.
    pub const RESERVED_ATTRIBUTES: [&'static str; 2] = ["objectID", "collection"];

    /// Create an empty document for a record.
    pub fn new(collection: impl Into<String>, id: &RecordId) -> Self {
        let collection = collection.into();
        Self {
            object_id: Self::object_id_for(&collection, id),
            collection,
            attributes: Map::new(),
        }
    }

    /// Build the object ID for a `(collection, id)` pair.
    ///
    /// # Example
    ///
    /// ```
    /// use content_sync_shared::{RecordId, SearchDocument};
    ///
    /// assert_eq!(SearchDocument::object_id_for("post", &RecordId::Int(42)), "post_42");
    /// ```
    pub fn object_id_for(collection: &str, id: &RecordId) -> String {
        format!("{}_{}", collection, id)
    }

    /// Set an attribute. Reserved names are ignored; returns whether the value
    /// was stored.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        if Self::RESERVED_ATTRIBUTES.contains(&name.as_str()) {
            return false;
        }
        self.attributes.insert(name, value);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_id_is_stable() {
        let a = SearchDocument::object_id_for("post", &RecordId::Int(42));
        let b = SearchDocument::object_id_for("post", &RecordId::Int(42));
        assert_eq!(a, "post_42");
        assert_eq!(a, b);
    }

    #[test]
    fn test_object_id_distinguishes_collections() {
        let id = RecordId::Int(1);
        assert_ne!(
            SearchDocument::object_id_for("post", &id),
            SearchDocument::object_id_for("pages", &id)
        );
    }

    #[test]
    fn test_reserved_attributes_are_ignored() {
        let mut doc = SearchDocument::new("post", &RecordId::Int(1));
        assert!(!doc.set("objectID", json!("evil")));
        assert!(!doc.set("collection", json!("other")));
        assert!(doc.set("title", json!("Hi")));
        assert_eq!(doc.object_id, "post_1");
        assert_eq!(doc.collection, "post");
    }

    #[test]
    fn test_serialization_shape() {
        let mut doc = SearchDocument::new("post", &RecordId::Int(42));
        doc.set("title", json!("Hi"));
        doc.set("content", json!("Hi"));

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "objectID": "post_42",
                "collection": "post",
                "title": "Hi",
                "content": "Hi"
            })
        );
    }
}
