//! Document transformer implementation.
//!
//! Maps CMS records into flat `SearchDocument`s for indexing.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use content_sync_shared::{CollectionConfig, Record, SearchDocument};

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Field whose string value is reduced to plain text.
const HTML_FIELD: &str = "content";

/// Attribute carrying the block type on documents of the shared blocks index.
const BLOCK_TYPE_ATTRIBUTE: &str = "block_type";

const URL_ATTRIBUTE: &str = "url";

/// Remove every HTML tag and trim surrounding whitespace.
///
/// Lossy: entities are left as-is and no structure survives.
pub fn strip_html(html: &str) -> String {
    HTML_TAG.replace_all(html, "").trim().to_string()
}

/// Public URL of a record by site convention.
///
/// `post` records live under `/blog/{slug}`, `pages` at `/{slug}` and every
/// speaking engagement on the single `/speaking` page. Collections without a
/// convention, and slugged collections whose record has no slug, get no URL.
pub fn url_for(collection: &str, record: &Record) -> Option<String> {
    match collection {
        "post" => record.get_str("slug").map(|slug| format!("/blog/{}", slug)),
        "pages" => record.get_str("slug").map(|slug| format!("/{}", slug)),
        "speaking" => Some("/speaking".to_string()),
        _ => None,
    }
}

/// Processed result from the document transformer.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedRecord {
    /// Document to be indexed (create or update).
    Index(SearchDocument),
    /// Record is not published; any previously indexed document must go.
    Delete { object_id: String },
    /// Record cannot be indexed at all.
    Skip { reason: String },
}

/// Transformer that turns records into search documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentTransformer;

impl DocumentTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Transform a batch of records of one collection.
    #[instrument(skip(self, records, config), fields(record_count = records.len()))]
    pub fn process_batch(
        &self,
        collection: &str,
        records: &[Record],
        config: &CollectionConfig,
    ) -> Vec<ProcessedRecord> {
        let processed: Vec<ProcessedRecord> = records
            .iter()
            .map(|record| self.process_record(collection, record, config))
            .collect();

        debug!(processed_count = processed.len(), "Processed record batch");
        processed
    }

    /// Apply the publication policy, then transform.
    pub fn process_record(
        &self,
        collection: &str,
        record: &Record,
        config: &CollectionConfig,
    ) -> ProcessedRecord {
        let Some(id) = record.id() else {
            warn!(collection = %collection, "Record has no usable id, skipping");
            return ProcessedRecord::Skip {
                reason: "record has no id".to_string(),
            };
        };

        if !record.is_published() {
            let object_id = SearchDocument::object_id_for(collection, &id);
            debug!(object_id = %object_id, status = ?record.status(), "Record not published");
            return ProcessedRecord::Delete { object_id };
        }

        match self.to_document(collection, record, config) {
            Some(document) => ProcessedRecord::Index(document),
            None => ProcessedRecord::Skip {
                reason: "record has no id".to_string(),
            },
        }
    }

    /// Build the search document for a record.
    ///
    /// Only fields of the configured index field set that are present on the
    /// record are copied. The result is a pure function of its inputs.
    /// Returns `None` if the record carries no id.
    pub fn to_document(
        &self,
        collection: &str,
        record: &Record,
        config: &CollectionConfig,
    ) -> Option<SearchDocument> {
        let id = record.id()?;
        let mut document = SearchDocument::new(collection, &id);

        for field in &config.fields {
            let Some(value) = record.get(field) else {
                continue;
            };
            let value = match value {
                Value::String(html) if field == HTML_FIELD => Value::String(strip_html(html)),
                other => other.clone(),
            };
            document.set(field.as_str(), value);
        }

        if let Some(block_type) = &config.block_type {
            document.set(BLOCK_TYPE_ATTRIBUTE, Value::String(block_type.clone()));
        }

        if let Some(url) = url_for(collection, record) {
            document.set(URL_ATTRIBUTE, Value::String(url));
        }

        Some(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_sync_shared::RankingDirective;
    use serde_json::json;

    fn post_config() -> CollectionConfig {
        CollectionConfig {
            collection: "post".to_string(),
            index_name: "posts".to_string(),
            fields: ["id", "title", "slug", "status", "date_created", "content"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            searchable_attributes: vec!["title".to_string(), "content".to_string()],
            facetable_attributes: vec!["status".to_string()],
            ranking: vec![RankingDirective::desc("date_created")],
            block_type: None,
        }
    }

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hi</p>"), "Hi");
        assert_eq!(strip_html("  <h1>A</h1> <em>b</em>  "), "A b");
        assert_eq!(strip_html("no tags"), "no tags");
        assert_eq!(strip_html("<br/>"), "");
    }

    #[test]
    fn test_strip_html_is_idempotent() {
        for input in ["<p>Hi</p>", " <div><a href=\"/x\">x</a></div> ", "a < b", "plain"] {
            let once = strip_html(input);
            assert_eq!(strip_html(&once), once);
        }
    }

    #[test]
    fn test_published_post_document() {
        let transformer = DocumentTransformer::new();
        let record = record(json!({
            "id": 42,
            "title": "Hi",
            "content": "<p>Hi</p>",
            "status": "published",
            "date_created": "2024-01-01"
        }));

        let doc = transformer
            .to_document("post", &record, &post_config())
            .unwrap();

        assert_eq!(doc.object_id, "post_42");
        assert_eq!(doc.collection, "post");
        assert_eq!(doc.get("title"), Some(&json!("Hi")));
        assert_eq!(doc.get("content"), Some(&json!("Hi")));
        assert_eq!(doc.get("date_created"), Some(&json!("2024-01-01")));
        // no slug on the record, so no url
        assert!(doc.get("url").is_none());
        assert!(doc.get("slug").is_none());
    }

    #[test]
    fn test_post_url_uses_slug() {
        let record = record(json!({"id": 1, "slug": "hello-world"}));
        let doc = DocumentTransformer::new()
            .to_document("post", &record, &post_config())
            .unwrap();
        assert_eq!(doc.get("url"), Some(&json!("/blog/hello-world")));
    }

    #[test]
    fn test_url_conventions() {
        let slugged = record(json!({"id": 1, "slug": "about"}));
        let bare = record(json!({"id": 1}));

        assert_eq!(url_for("pages", &slugged), Some("/about".to_string()));
        assert_eq!(url_for("pages", &bare), None);
        assert_eq!(url_for("speaking", &bare), Some("/speaking".to_string()));
        assert_eq!(url_for("podcasts", &slugged), None);
    }

    #[test]
    fn test_fields_outside_config_are_not_copied() {
        let record = record(json!({"id": 1, "title": "T", "secret": "s"}));
        let doc = DocumentTransformer::new()
            .to_document("post", &record, &post_config())
            .unwrap();
        assert!(doc.get("secret").is_none());
    }

    #[test]
    fn test_null_values_are_copied() {
        let record = record(json!({"id": 1, "title": null}));
        let doc = DocumentTransformer::new()
            .to_document("post", &record, &post_config())
            .unwrap();
        assert_eq!(doc.get("title"), Some(&Value::Null));
    }

    #[test]
    fn test_non_string_content_is_untouched() {
        let record = record(json!({"id": 1, "content": {"blocks": ["<p>x</p>"]}}));
        let doc = DocumentTransformer::new()
            .to_document("post", &record, &post_config())
            .unwrap();
        assert_eq!(doc.get("content"), Some(&json!({"blocks": ["<p>x</p>"]})));
    }

    #[test]
    fn test_block_type_attached() {
        let config = CollectionConfig {
            collection: "block_hero".to_string(),
            index_name: "blocks".to_string(),
            fields: vec!["id".to_string(), "headline".to_string()],
            searchable_attributes: vec!["headline".to_string()],
            facetable_attributes: vec![],
            ranking: vec![],
            block_type: Some("hero".to_string()),
        };
        let record = record(json!({"id": "9f1c", "headline": "Welcome"}));
        let doc = DocumentTransformer::new()
            .to_document("block_hero", &record, &config)
            .unwrap();

        assert_eq!(doc.object_id, "block_hero_9f1c");
        assert_eq!(doc.get("block_type"), Some(&json!("hero")));
    }

    #[test]
    fn test_draft_becomes_delete() {
        let record = record(json!({"id": 42, "title": "Hi", "status": "draft"}));
        let result = DocumentTransformer::new().process_record("post", &record, &post_config());
        assert_eq!(
            result,
            ProcessedRecord::Delete {
                object_id: "post_42".to_string()
            }
        );
    }

    #[test]
    fn test_record_without_status_is_indexed() {
        let record = record(json!({"id": 7, "title": "No status"}));
        let result = DocumentTransformer::new().process_record("post", &record, &post_config());
        assert!(matches!(result, ProcessedRecord::Index(_)));
    }

    #[test]
    fn test_record_without_id_is_skipped() {
        let record = record(json!({"title": "orphan", "status": "published"}));
        let result = DocumentTransformer::new().process_record("post", &record, &post_config());
        assert!(matches!(result, ProcessedRecord::Skip { .. }));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let transformer = DocumentTransformer::new();
        let record = record(json!({
            "id": 42,
            "title": "Hi",
            "content": "<p>Hi</p>",
            "status": "published",
            "slug": "hi"
        }));

        let first = transformer.to_document("post", &record, &post_config()).unwrap();
        let second = transformer.to_document("post", &record, &post_config()).unwrap();

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_process_batch() {
        let records = vec![
            record(json!({"id": 1, "status": "published"})),
            record(json!({"id": 2, "status": "archived"})),
            record(json!({"title": "no id"})),
        ];
        let processed = DocumentTransformer::new().process_batch("post", &records, &post_config());

        assert_eq!(processed.len(), 3);
        assert!(matches!(processed[0], ProcessedRecord::Index(_)));
        assert!(matches!(processed[1], ProcessedRecord::Delete { .. }));
        assert!(matches!(processed[2], ProcessedRecord::Skip { .. }));
    }
}
