//! Search index provider trait definition.
//!
//! This module defines the abstract interface for hosted search index
//! operations, allowing the pipeline to run against Algolia in production
//! and against in-memory mocks in tests.

use async_trait::async_trait;

use content_sync_shared::SearchDocument;

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationSummary, IndexSettings};

/// Abstracts the hosted search service.
///
/// Every method is addressed by index name because one pipeline run writes to
/// many indices. All methods return `Result<T, SearchIndexError>` for
/// consistent error handling across backends.
///
/// # Note on Document Creation
///
/// There is no separate create call. `save_documents` replaces the stored
/// document with the same `objectID` or inserts it if absent.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Verify the service is reachable with the configured credentials.
    async fn health_check(&self) -> Result<(), SearchIndexError>;

    /// Replace the settings of an index. Creates the index if it does not
    /// exist yet. Idempotent: the last write wins.
    async fn set_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError>;

    /// Replace-or-insert documents keyed by `objectID`.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-document results
    /// * `Err(SearchIndexError)` - If the request could not be made at all
    async fn save_documents(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Delete one document. Deleting a document that does not exist succeeds.
    async fn delete_document(&self, index: &str, object_id: &str) -> Result<(), SearchIndexError>;

    /// Delete several documents. Missing documents count as successful
    /// deletions.
    async fn delete_documents(
        &self,
        index: &str,
        object_ids: &[String],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// List the object IDs of every document matching `filter`.
    ///
    /// A missing index yields an empty list.
    async fn browse_object_ids(
        &self,
        index: &str,
        filter: &str,
    ) -> Result<Vec<String>, SearchIndexError>;
}
