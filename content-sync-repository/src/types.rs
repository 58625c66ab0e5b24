//! Request and response types for search index operations.

use serde::{Deserialize, Serialize};

use content_sync_shared::CollectionConfig;

use crate::errors::SearchIndexError;

/// Attribute every document carries to record its source collection.
pub const COLLECTION_ATTRIBUTE: &str = "collection";

/// Index-level settings pushed before each bulk pass.
///
/// Serialized with the search service's own key names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    pub searchable_attributes: Vec<String>,
    pub attributes_for_faceting: Vec<String>,
    pub custom_ranking: Vec<String>,
}

impl IndexSettings {
    /// Build settings from a derived collection configuration.
    ///
    /// `collection` is always added as a filter-only facet so stale-document
    /// discovery can filter on it.
    pub fn from_config(config: &CollectionConfig) -> Self {
        let mut attributes_for_faceting = config.facetable_attributes.clone();
        let collection_filter = format!("filterOnly({})", COLLECTION_ATTRIBUTE);
        if !attributes_for_faceting
            .iter()
            .any(|a| a == COLLECTION_ATTRIBUTE || *a == collection_filter)
        {
            attributes_for_faceting.push(collection_filter);
        }

        Self {
            searchable_attributes: config.searchable_attributes.clone(),
            attributes_for_faceting,
            custom_ranking: config.ranking.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Build the filter expression selecting every document of one collection.
pub fn collection_filter(collection: &str) -> String {
    format!(
        "{}:\"{}\"",
        COLLECTION_ATTRIBUTE,
        collection.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

/// Result of a batch operation for a single document.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The document's object ID.
    pub object_id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

/// Summary of a batch operation containing aggregate statistics and
/// individual results, so callers can handle partial failures.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Summary for a batch that was accepted as a whole.
    pub fn all_succeeded<'a>(object_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let results: Vec<BatchOperationResult> = object_ids
            .into_iter()
            .map(|id| BatchOperationResult {
                object_id: id.to_string(),
                success: true,
                error: None,
            })
            .collect();
        Self {
            total: results.len(),
            succeeded: results.len(),
            failed: 0,
            results,
        }
    }

    /// Summary for a batch that was rejected as a whole.
    pub fn all_failed<'a>(
        object_ids: impl IntoIterator<Item = &'a str>,
        error: &SearchIndexError,
    ) -> Self {
        let results: Vec<BatchOperationResult> = object_ids
            .into_iter()
            .map(|id| BatchOperationResult {
                object_id: id.to_string(),
                success: false,
                error: Some(error.clone()),
            })
            .collect();
        Self {
            total: results.len(),
            succeeded: 0,
            failed: results.len(),
            results,
        }
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: BatchOperationSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.results.extend(other.results);
    }
}
