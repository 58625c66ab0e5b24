//! Algolia provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! on top of the Algolia REST API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use content_sync_shared::SearchDocument;

use crate::algolia::config::AlgoliaConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationSummary, IndexSettings};

/// Number of hits requested per browse page (the service maximum).
const BROWSE_PAGE_SIZE: usize = 1000;

#[derive(Debug, Deserialize)]
struct BrowseHit {
    #[serde(rename = "objectID")]
    object_id: String,
}

#[derive(Debug, Deserialize)]
struct BrowsePage {
    #[serde(default)]
    hits: Vec<BrowseHit>,
    #[serde(default)]
    cursor: Option<String>,
}

/// Algolia provider implementation.
///
/// # Example
///
/// ```ignore
/// use content_sync_repository::{AlgoliaConfig, AlgoliaProvider, SearchIndexProvider};
///
/// let config = AlgoliaConfig::new("APPID", "admin-key")?;
/// let provider = AlgoliaProvider::new(config)?;
/// provider.delete_document("posts", "post_42").await?;
/// ```
pub struct AlgoliaProvider {
    client: Client,
    config: AlgoliaConfig,
}

impl AlgoliaProvider {
    /// Create a new provider for the configured application.
    ///
    /// # Returns
    ///
    /// * `Ok(AlgoliaProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the HTTP client cannot be built
    pub fn new(config: AlgoliaConfig) -> Result<Self, SearchIndexError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        info!(
            application_id = %config.application_id,
            write_host = %config.write_host,
            read_host = %config.read_host,
            "Created Algolia provider"
        );

        Ok(Self { client, config })
    }

    /// Append percent-encoded path segments to a host URL.
    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, SearchIndexError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SearchIndexError::connection(format!("Host '{}' cannot be used as a base URL", base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn validate_index_name(index: &str) -> Result<(), SearchIndexError> {
        if index.trim().is_empty() {
            return Err(SearchIndexError::validation("Index name cannot be empty"));
        }
        Ok(())
    }

    fn validate_object_ids<'a>(
        object_ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), SearchIndexError> {
        for object_id in object_ids {
            if object_id.is_empty() {
                return Err(SearchIndexError::validation("Object IDs cannot be empty"));
            }
        }
        Ok(())
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("X-Algolia-Application-Id", &self.config.application_id)
            .header("X-Algolia-API-Key", &self.config.api_key)
    }

    /// Build the body of a batch request applying `action` to every entry.
    fn batch_body(action: &str, bodies: Vec<Value>) -> Value {
        let requests: Vec<Value> = bodies
            .into_iter()
            .map(|body| json!({ "action": action, "body": body }))
            .collect();
        json!({ "requests": requests })
    }

    /// Turn a non-success response into an error built by `make_error`.
    async fn ensure_success(
        response: Response,
        operation: &str,
        make_error: fn(String) -> SearchIndexError,
    ) -> Result<Response, SearchIndexError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, operation, "Search service request failed");
        Err(make_error(format!(
            "{} failed with status {}: {}",
            operation, status, error_body
        )))
    }

    /// Send a batch request, returning per-document results.
    async fn send_batch(
        &self,
        index: &str,
        object_ids: &[&str],
        body: Value,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let url = Self::endpoint(&self.config.write_host, &["1", "indexes", index, "batch"])?;
        let response = self
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_index(e.to_string()))?;

        match Self::ensure_success(response, "Batch", SearchIndexError::BulkIndexError).await {
            Ok(_) => Ok(BatchOperationSummary::all_succeeded(object_ids.iter().copied())),
            Err(e) => Ok(BatchOperationSummary::all_failed(
                object_ids.iter().copied(),
                &e,
            )),
        }
    }

    /// Fetch one browse page. Returns `None` when the index does not exist.
    async fn browse_page(
        &self,
        index: &str,
        filter: &str,
        cursor: Option<&str>,
    ) -> Result<Option<BrowsePage>, SearchIndexError> {
        let url = Self::endpoint(&self.config.read_host, &["1", "indexes", index, "browse"])?;

        let mut body = json!({
            "filters": filter,
            "attributesToRetrieve": ["objectID"],
            "hitsPerPage": BROWSE_PAGE_SIZE,
        });
        if let Some(cursor) = cursor {
            body["cursor"] = json!(cursor);
        }

        let response = self
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchIndexError::browse(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response =
            Self::ensure_success(response, "Browse", SearchIndexError::BrowseError).await?;
        let page = response
            .json::<BrowsePage>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        Ok(Some(page))
    }
}

#[async_trait]
impl SearchIndexProvider for AlgoliaProvider {
    async fn health_check(&self) -> Result<(), SearchIndexError> {
        let url = Self::endpoint(&self.config.read_host, &["1", "indexes"])?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        Self::ensure_success(response, "List indices", SearchIndexError::ConnectionError).await?;
        debug!("Search service reachable");
        Ok(())
    }

    async fn set_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError> {
        Self::validate_index_name(index)?;
        let url = Self::endpoint(&self.config.write_host, &["1", "indexes", index, "settings"])?;

        let response = self
            .request(Method::PUT, url)
            .json(settings)
            .send()
            .await
            .map_err(|e| SearchIndexError::settings(e.to_string()))?;

        Self::ensure_success(response, "Set settings", SearchIndexError::SettingsError).await?;
        debug!(index = %index, "Index settings updated");
        Ok(())
    }

    async fn save_documents(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        Self::validate_index_name(index)?;
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }
        Self::validate_object_ids(documents.iter().map(|d| d.object_id.as_str()))?;

        let bodies = documents
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;
        let object_ids: Vec<&str> = documents.iter().map(|d| d.object_id.as_str()).collect();

        let summary = self
            .send_batch(index, &object_ids, Self::batch_body("updateObject", bodies))
            .await?;
        debug!(
            index = %index,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Documents saved"
        );
        Ok(summary)
    }

    async fn delete_document(&self, index: &str, object_id: &str) -> Result<(), SearchIndexError> {
        Self::validate_index_name(index)?;
        Self::validate_object_ids([object_id])?;
        let url = Self::endpoint(&self.config.write_host, &["1", "indexes", index, object_id])?;

        let response = self
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        // 404 is acceptable - the document or the whole index may not exist
        if response.status() != StatusCode::NOT_FOUND {
            Self::ensure_success(response, "Delete", SearchIndexError::DeleteError).await?;
        }

        debug!(index = %index, object_id = %object_id, "Document deleted");
        Ok(())
    }

    async fn delete_documents(
        &self,
        index: &str,
        object_ids: &[String],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        Self::validate_index_name(index)?;
        if object_ids.is_empty() {
            return Ok(BatchOperationSummary::default());
        }
        Self::validate_object_ids(object_ids.iter().map(String::as_str))?;

        let bodies = object_ids
            .iter()
            .map(|id| json!({ "objectID": id }))
            .collect();
        let ids: Vec<&str> = object_ids.iter().map(String::as_str).collect();

        self.send_batch(index, &ids, Self::batch_body("deleteObject", bodies))
            .await
    }

    async fn browse_object_ids(
        &self,
        index: &str,
        filter: &str,
    ) -> Result<Vec<String>, SearchIndexError> {
        Self::validate_index_name(index)?;

        let mut object_ids = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = match self.browse_page(index, filter, cursor.as_deref()).await? {
                Some(page) => page,
                None => {
                    debug!(index = %index, "Index does not exist yet, nothing to browse");
                    break;
                }
            };

            object_ids.extend(page.hits.into_iter().map(|hit| hit.object_id));

            match page.cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        debug!(index = %index, filter = %filter, count = object_ids.len(), "Browsed object IDs");
        Ok(object_ids)
    }
}
