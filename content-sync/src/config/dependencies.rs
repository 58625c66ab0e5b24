//! Dependency initialization and wiring for the content sync pipeline.

use std::sync::Arc;
use tracing::info;

use crate::classifier::SchemaClassifier;
use crate::config::SyncSettings;
use crate::fetcher::{ContentFetcher, DirectusClient};
use crate::loader::{IndexWriter, WriterConfig};
use crate::orchestrator::SyncOrchestrator;
use crate::processor::DocumentTransformer;
use crate::ContentSyncError;
use content_sync_repository::{AlgoliaConfig, AlgoliaProvider};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: SyncOrchestrator,
}

impl Dependencies {
    /// Build the CMS client, the search provider and the orchestrator.
    ///
    /// No network calls are made here; use
    /// [`SyncOrchestrator::check_connections`] to verify reachability.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ContentSyncError)` - If a client cannot be constructed
    pub fn new(settings: SyncSettings) -> Result<Self, ContentSyncError> {
        info!(
            directus_url = %settings.directus_url,
            algolia_application_id = %settings.algolia_application_id,
            batch_size = settings.batch_size,
            http_timeout_secs = ?settings.http_timeout.map(|t| t.as_secs()),
            "Initializing dependencies"
        );

        let directus = DirectusClient::new(
            &settings.directus_url,
            settings.directus_token,
            settings.http_timeout,
        )
        .map_err(|e| ContentSyncError::config(format!("Failed to create CMS client: {}", e)))?;

        let mut algolia_config =
            AlgoliaConfig::new(settings.algolia_application_id, settings.algolia_api_key)
                .map_err(|e| ContentSyncError::config(format!("Invalid search config: {}", e)))?
                .with_timeout(settings.http_timeout);
        if let Some(host) = settings.algolia_host.as_deref() {
            algolia_config = algolia_config
                .with_host(host)
                .map_err(|e| ContentSyncError::config(format!("Invalid ALGOLIA_HOST: {}", e)))?;
        }
        let provider = AlgoliaProvider::new(algolia_config).map_err(|e| {
            ContentSyncError::config(format!("Failed to create search provider: {}", e))
        })?;

        let fetcher = ContentFetcher::new(Arc::new(directus));
        let writer = IndexWriter::with_config(
            Arc::new(provider),
            WriterConfig {
                batch_size: settings.batch_size,
            },
        );

        let orchestrator = SyncOrchestrator::new(
            fetcher,
            SchemaClassifier::new(),
            DocumentTransformer::new(),
            writer,
        );

        Ok(Self { orchestrator })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::SyncState;

    fn settings(directus_url: &str) -> SyncSettings {
        SyncSettings {
            directus_url: directus_url.to_string(),
            directus_token: "token".to_string(),
            algolia_application_id: "APPID".to_string(),
            algolia_api_key: "key".to_string(),
            algolia_host: None,
            batch_size: 100,
            http_timeout: None,
        }
    }

    #[test]
    fn test_wires_idle_orchestrator() {
        let deps = Dependencies::new(settings("https://cms.example.com")).unwrap();
        assert_eq!(deps.orchestrator.state(), SyncState::Idle);
    }

    #[test]
    fn test_invalid_cms_url_is_config_error() {
        let result = Dependencies::new(settings("not a url"));
        assert!(matches!(result, Err(ContentSyncError::ConfigError(_))));
    }
}
