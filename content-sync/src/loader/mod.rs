//! Loader module for the content sync pipeline.
//!
//! Writes index settings and documents to the hosted search service.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::SyncError;
use content_sync_repository::types::collection_filter;
use content_sync_repository::{BatchOperationSummary, IndexSettings, SearchIndexProvider};
use content_sync_shared::{CollectionConfig, SearchDocument};

/// Default maximum number of documents per batch request.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Configuration for the index writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Maximum number of documents sent in one batch request.
    pub batch_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Writer that pushes settings and documents into search indices.
///
/// The writer is responsible for:
/// - Applying derived index settings
/// - Splitting large upserts and deletes into batches
/// - Removing documents of a collection that are no longer in the CMS
#[derive(Clone)]
pub struct IndexWriter {
    provider: Arc<dyn SearchIndexProvider>,
    config: WriterConfig,
}

impl IndexWriter {
    /// Create a new index writer with the given provider.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self::with_config(provider, WriterConfig::default())
    }

    /// Create a new index writer with custom configuration.
    pub fn with_config(provider: Arc<dyn SearchIndexProvider>, config: WriterConfig) -> Self {
        let batch_size = config.batch_size.max(1);
        Self {
            provider,
            config: WriterConfig { batch_size },
        }
    }

    /// Apply a collection's derived settings to its index. Idempotent.
    #[instrument(skip(self, config), fields(collection = %config.collection, index = %config.index_name))]
    pub async fn configure(&self, config: &CollectionConfig) -> Result<(), SyncError> {
        let settings = IndexSettings::from_config(config);
        self.provider
            .set_settings(&config.index_name, &settings)
            .await?;

        info!(
            searchable = settings.searchable_attributes.len(),
            facets = settings.attributes_for_faceting.len(),
            ranking = ?settings.custom_ranking,
            "Configured index"
        );
        Ok(())
    }

    /// Replace-or-insert documents in batches of at most `batch_size`.
    ///
    /// Per-document failures are logged and reported in the summary. A batch
    /// that cannot be sent at all aborts the remaining batches.
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub async fn upsert_many(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SyncError> {
        let mut summary = BatchOperationSummary::default();

        for chunk in documents.chunks(self.config.batch_size) {
            debug!(count = chunk.len(), "Saving document batch");
            match self.provider.save_documents(index, chunk).await {
                Ok(batch) => {
                    Self::log_failures(&batch, "Failed to save document");
                    summary.merge(batch);
                }
                Err(e) => {
                    error!(error = %e, count = chunk.len(), "Failed to save document batch");
                    return Err(e.into());
                }
            }
        }

        if summary.failed > 0 {
            warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Upsert completed with some failures"
            );
        } else {
            debug!(count = summary.succeeded, "Saved all documents");
        }
        Ok(summary)
    }

    /// Delete one document. A document that does not exist is not an error.
    #[instrument(skip(self))]
    pub async fn delete_one(&self, index: &str, object_id: &str) -> Result<(), SyncError> {
        self.provider.delete_document(index, object_id).await?;
        debug!("Deleted document");
        Ok(())
    }

    /// Delete several documents in batches. Missing documents count as
    /// deleted.
    #[instrument(skip(self, object_ids), fields(count = object_ids.len()))]
    pub async fn delete_many(
        &self,
        index: &str,
        object_ids: &[String],
    ) -> Result<BatchOperationSummary, SyncError> {
        let mut summary = BatchOperationSummary::default();

        for chunk in object_ids.chunks(self.config.batch_size) {
            let batch = self.provider.delete_documents(index, chunk).await?;
            Self::log_failures(&batch, "Failed to delete document");
            summary.merge(batch);
        }
        Ok(summary)
    }

    /// Delete every document of `collection` in `index` whose object ID is
    /// not in `keep`. Returns the number of documents deleted.
    ///
    /// Other collections sharing the index are never touched.
    #[instrument(skip(self, keep), fields(keep = keep.len()))]
    pub async fn clean_stale(
        &self,
        index: &str,
        collection: &str,
        keep: &HashSet<String>,
    ) -> Result<usize, SyncError> {
        let existing = self
            .provider
            .browse_object_ids(index, &collection_filter(collection))
            .await?;

        let stale: Vec<String> = existing
            .into_iter()
            .filter(|object_id| !keep.contains(object_id))
            .collect();

        if stale.is_empty() {
            debug!("No stale documents");
            return Ok(0);
        }

        let summary = self.delete_many(index, &stale).await?;
        info!(
            deleted = summary.succeeded,
            failed = summary.failed,
            "Removed stale documents"
        );
        Ok(summary.succeeded)
    }

    /// Check that the search service is reachable.
    pub async fn check_ready(&self) -> Result<(), SyncError> {
        self.provider.health_check().await?;
        Ok(())
    }

    fn log_failures(summary: &BatchOperationSummary, message: &str) {
        for result in summary.results.iter().filter(|r| !r.success) {
            if let Some(ref err) = result.error {
                error!(object_id = %result.object_id, error = %err, "{}", message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use content_sync_repository::SearchIndexError;
    use content_sync_shared::RecordId;
    use std::sync::Mutex;

    /// Mock search provider for testing.
    #[derive(Default)]
    struct MockSearchProvider {
        saved_batches: Mutex<Vec<usize>>,
        deleted: Mutex<Vec<String>>,
        existing: Vec<String>,
        browse_filters: Mutex<Vec<String>>,
        settings: Mutex<Vec<(String, IndexSettings)>>,
        fail_saves: bool,
    }

    #[async_trait]
    impl SearchIndexProvider for MockSearchProvider {
        async fn health_check(&self) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn set_settings(
            &self,
            index: &str,
            settings: &IndexSettings,
        ) -> Result<(), SearchIndexError> {
            self.settings
                .lock()
                .unwrap()
                .push((index.to_string(), settings.clone()));
            Ok(())
        }

        async fn save_documents(
            &self,
            _index: &str,
            documents: &[SearchDocument],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            if self.fail_saves {
                return Err(SearchIndexError::connection("unreachable"));
            }
            self.saved_batches.lock().unwrap().push(documents.len());
            Ok(BatchOperationSummary::all_succeeded(
                documents.iter().map(|d| d.object_id.as_str()),
            ))
        }

        async fn delete_document(
            &self,
            _index: &str,
            object_id: &str,
        ) -> Result<(), SearchIndexError> {
            self.deleted.lock().unwrap().push(object_id.to_string());
            Ok(())
        }

        async fn delete_documents(
            &self,
            _index: &str,
            object_ids: &[String],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            self.deleted.lock().unwrap().extend(object_ids.iter().cloned());
            Ok(BatchOperationSummary::all_succeeded(
                object_ids.iter().map(String::as_str),
            ))
        }

        async fn browse_object_ids(
            &self,
            _index: &str,
            filter: &str,
        ) -> Result<Vec<String>, SearchIndexError> {
            self.browse_filters.lock().unwrap().push(filter.to_string());
            Ok(self.existing.clone())
        }
    }

    fn documents(count: i64) -> Vec<SearchDocument> {
        (0..count)
            .map(|i| SearchDocument::new("post", &RecordId::Int(i)))
            .collect()
    }

    #[tokio::test]
    async fn test_upsert_is_batched() {
        let provider = Arc::new(MockSearchProvider::default());
        let writer = IndexWriter::with_config(provider.clone(), WriterConfig { batch_size: 2 });

        let summary = writer.upsert_many("posts", &documents(5)).await.unwrap();

        assert_eq!(summary.succeeded, 5);
        assert_eq!(*provider.saved_batches.lock().unwrap(), vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_upsert_of_nothing_sends_nothing() {
        let provider = Arc::new(MockSearchProvider::default());
        let writer = IndexWriter::new(provider.clone());

        let summary = writer.upsert_many("posts", &[]).await.unwrap();

        assert_eq!(summary.total, 0);
        assert!(provider.saved_batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_transport_failure_is_an_error() {
        let provider = Arc::new(MockSearchProvider {
            fail_saves: true,
            ..Default::default()
        });
        let writer = IndexWriter::new(provider);

        let result = writer.upsert_many("posts", &documents(1)).await;
        assert!(matches!(result, Err(SyncError::IndexError(_))));
    }

    #[tokio::test]
    async fn test_clean_stale_keeps_rewritten_documents() {
        let provider = Arc::new(MockSearchProvider {
            existing: vec![
                "post_1".to_string(),
                "post_2".to_string(),
                "post_3".to_string(),
            ],
            ..Default::default()
        });
        let writer = IndexWriter::new(provider.clone());
        let keep: HashSet<String> = ["post_2".to_string()].into_iter().collect();

        let deleted = writer.clean_stale("posts", "post", &keep).await.unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(*provider.deleted.lock().unwrap(), vec!["post_1", "post_3"]);
        assert_eq!(
            *provider.browse_filters.lock().unwrap(),
            vec!["collection:\"post\""]
        );
    }

    #[tokio::test]
    async fn test_clean_stale_with_nothing_to_remove() {
        let provider = Arc::new(MockSearchProvider {
            existing: vec!["post_1".to_string()],
            ..Default::default()
        });
        let writer = IndexWriter::new(provider.clone());
        let keep: HashSet<String> = ["post_1".to_string()].into_iter().collect();

        assert_eq!(writer.clean_stale("posts", "post", &keep).await.unwrap(), 0);
        assert!(provider.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_configure_uses_index_name() {
        let provider = Arc::new(MockSearchProvider::default());
        let writer = IndexWriter::new(provider.clone());
        let config = CollectionConfig {
            collection: "block_hero".to_string(),
            index_name: "blocks".to_string(),
            fields: vec!["id".to_string()],
            searchable_attributes: vec!["headline".to_string()],
            facetable_attributes: vec![],
            ranking: vec![],
            block_type: Some("hero".to_string()),
        };

        writer.configure(&config).await.unwrap();

        let settings = provider.settings.lock().unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].0, "blocks");
        assert_eq!(settings[0].1.searchable_attributes, vec!["headline"]);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_clamped() {
        let provider = Arc::new(MockSearchProvider::default());
        let writer = IndexWriter::with_config(provider.clone(), WriterConfig { batch_size: 0 });

        writer.upsert_many("posts", &documents(2)).await.unwrap();
        assert_eq!(*provider.saved_batches.lock().unwrap(), vec![1, 1]);
    }
}
