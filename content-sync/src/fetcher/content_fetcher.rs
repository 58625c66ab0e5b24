//! CMS access trait and the soft-failing fetcher built on it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use content_sync_shared::{Collection, FieldDescriptor, FieldType, Record, RecordId};

use crate::classifier::is_excluded;
use crate::errors::FetchError;

/// Which records a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every record regardless of status.
    Any,
    /// Only records whose `status` is `published`, filtered server-side.
    PublishedOnly,
}

/// Read-only access to the CMS.
///
/// This trait abstracts the HTTP client so the pipeline can be driven by an
/// in-memory source in tests. Implementations report every failure; the
/// fail-soft policy lives in [`ContentFetcher`].
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Verify the CMS is reachable with the configured credentials.
    async fn server_info(&self) -> Result<(), FetchError>;

    /// List every collection the CMS knows about.
    async fn collections(&self) -> Result<Vec<Collection>, FetchError>;

    /// List the field descriptors of one collection.
    async fn fields(&self, collection: &str) -> Result<Vec<FieldDescriptor>, FetchError>;

    /// List the records of one collection, restricted to `fields`.
    async fn items(
        &self,
        collection: &str,
        fields: &[String],
        filter: StatusFilter,
    ) -> Result<Vec<Record>, FetchError>;

    /// Read one record by key. `Ok(None)` if it does not exist.
    async fn item(&self, collection: &str, id: &RecordId) -> Result<Option<Record>, FetchError>;
}

/// Content fetcher with the pipeline's failure policy applied.
///
/// Listing collections and fields never fails: errors are logged and an
/// empty (or minimal) result is returned. Record fetches fall back to an
/// unfiltered listing once before reporting an error.
#[derive(Clone)]
pub struct ContentFetcher {
    source: Arc<dyn ContentSource>,
}

impl ContentFetcher {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Check that the CMS answers.
    pub async fn check_connection(&self) -> Result<(), FetchError> {
        self.source.server_info().await
    }

    /// Collections eligible for indexing: not excluded, no reserved system
    /// prefix, not hidden. Empty on error.
    #[instrument(skip(self))]
    pub async fn list_collections(&self) -> Vec<Collection> {
        let collections = match self.source.collections().await {
            Ok(collections) => collections,
            Err(e) => {
                error!(error = %e, "Failed to discover collections");
                return Vec::new();
            }
        };

        let indexable: Vec<Collection> = collections
            .into_iter()
            .filter(|c| !is_excluded(&c.name))
            .filter(|c| !c.hidden)
            .collect();

        info!(count = indexable.len(), "Discovered indexable collections");
        for collection in &indexable {
            debug!(collection = %collection.name, note = ?collection.note, "Indexable collection");
        }
        indexable
    }

    /// Field descriptors for a collection. On error, a minimal descriptor set
    /// containing only `id` is returned.
    #[instrument(skip(self))]
    pub async fn list_fields(&self, collection: &str) -> Vec<FieldDescriptor> {
        match self.source.fields(collection).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!(
                    collection = %collection,
                    error = %e,
                    "Failed to read fields, using minimal field set"
                );
                Self::minimal_fields()
            }
        }
    }

    /// Records for a collection.
    ///
    /// A failed `PublishedOnly` fetch is retried once without the filter and
    /// the publication policy is applied locally. This is a fallback for
    /// collections the CMS cannot filter on status, not a transient-fault
    /// retry.
    #[instrument(skip(self, fields), fields(field_count = fields.len()))]
    pub async fn fetch_records(
        &self,
        collection: &str,
        fields: &[String],
        filter: StatusFilter,
    ) -> Result<Vec<Record>, FetchError> {
        match self.source.items(collection, fields, filter).await {
            Ok(records) => Ok(records),
            Err(e) if filter == StatusFilter::PublishedOnly => {
                warn!(
                    collection = %collection,
                    error = %e,
                    "Filtered fetch failed, retrying without status filter"
                );
                let records = self
                    .source
                    .items(collection, fields, StatusFilter::Any)
                    .await?;
                Ok(records.into_iter().filter(Record::is_published).collect())
            }
            Err(e) => Err(e),
        }
    }

    /// Read a single record by key.
    pub async fn fetch_record(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<Option<Record>, FetchError> {
        self.source.item(collection, id).await
    }

    fn minimal_fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::new("id", FieldType::Other("unknown".to_string()))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Source whose filtered item listing can be made to fail.
    struct FlakySource {
        fail_filtered: bool,
        fail_unfiltered: bool,
        calls: Mutex<Vec<StatusFilter>>,
    }

    impl FlakySource {
        fn new(fail_filtered: bool, fail_unfiltered: bool) -> Self {
            Self {
                fail_filtered,
                fail_unfiltered,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ContentSource for FlakySource {
        async fn server_info(&self) -> Result<(), FetchError> {
            Ok(())
        }

        async fn collections(&self) -> Result<Vec<Collection>, FetchError> {
            Ok(vec![
                Collection::new("post"),
                Collection::new("directus_users"),
                Collection::new("post_tags"),
                Collection {
                    name: "drafts_folder".to_string(),
                    note: None,
                    hidden: true,
                },
                Collection::new("speaking"),
            ])
        }

        async fn fields(&self, _collection: &str) -> Result<Vec<FieldDescriptor>, FetchError> {
            Err(FetchError::api("forbidden"))
        }

        async fn items(
            &self,
            _collection: &str,
            _fields: &[String],
            filter: StatusFilter,
        ) -> Result<Vec<Record>, FetchError> {
            self.calls.lock().unwrap().push(filter);
            let fail = match filter {
                StatusFilter::PublishedOnly => self.fail_filtered,
                StatusFilter::Any => self.fail_unfiltered,
            };
            if fail {
                return Err(FetchError::api("invalid filter"));
            }
            Ok(vec![
                Record::from_value(json!({"id": 1, "status": "published"})).unwrap(),
                Record::from_value(json!({"id": 2, "status": "draft"})).unwrap(),
                Record::from_value(json!({"id": 3})).unwrap(),
            ])
        }

        async fn item(
            &self,
            _collection: &str,
            _id: &RecordId,
        ) -> Result<Option<Record>, FetchError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_list_collections_applies_exclusions() {
        let fetcher = ContentFetcher::new(Arc::new(FlakySource::new(false, false)));
        let names: Vec<String> = fetcher
            .list_collections()
            .await
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["post", "speaking"]);
    }

    #[tokio::test]
    async fn test_list_fields_falls_back_to_minimal_set() {
        let fetcher = ContentFetcher::new(Arc::new(FlakySource::new(false, false)));
        let fields = fetcher.list_fields("post").await;
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "id");
    }

    #[tokio::test]
    async fn test_fetch_records_retries_without_filter() {
        let source = Arc::new(FlakySource::new(true, false));
        let fetcher = ContentFetcher::new(source.clone());

        let records = fetcher
            .fetch_records("post", &["id".to_string()], StatusFilter::PublishedOnly)
            .await
            .unwrap();

        let ids: Vec<String> = records.iter().filter_map(|r| r.id()).map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(
            *source.calls.lock().unwrap(),
            vec![StatusFilter::PublishedOnly, StatusFilter::Any]
        );
    }

    #[tokio::test]
    async fn test_fetch_records_gives_up_after_fallback() {
        let fetcher = ContentFetcher::new(Arc::new(FlakySource::new(true, true)));
        let result = fetcher
            .fetch_records("post", &["id".to_string()], StatusFilter::PublishedOnly)
            .await;
        assert!(matches!(result, Err(FetchError::Api(_))));
    }

    #[tokio::test]
    async fn test_unfiltered_failure_is_not_retried() {
        let source = Arc::new(FlakySource::new(false, true));
        let fetcher = ContentFetcher::new(source.clone());
        let result = fetcher
            .fetch_records("post", &["id".to_string()], StatusFilter::Any)
            .await;
        assert!(result.is_err());
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }
}
