//! Algolia connection configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::errors::SearchIndexError;

/// Configuration for connecting to an Algolia application.
#[derive(Clone)]
pub struct AlgoliaConfig {
    /// The application ID (also used to derive the default hosts).
    pub application_id: String,
    /// Admin API key. Required for settings, writes and browse.
    pub api_key: String,
    /// Host used for settings and write operations.
    pub write_host: Url,
    /// Host used for read operations (browse, index listing).
    pub read_host: Url,
    /// Per-request timeout. `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,
}

impl AlgoliaConfig {
    /// Create a configuration with the standard hosts for `application_id`.
    ///
    /// # Arguments
    ///
    /// * `application_id` - The Algolia application ID
    /// * `api_key` - The admin API key
    pub fn new(
        application_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, SearchIndexError> {
        let application_id = application_id.into();
        if application_id.trim().is_empty() {
            return Err(SearchIndexError::validation("Application ID is required"));
        }

        let host_id = application_id.to_lowercase();
        let write_host = parse_host(&format!("https://{}.algolia.net", host_id))?;
        let read_host = parse_host(&format!("https://{}-dsn.algolia.net", host_id))?;

        Ok(Self {
            application_id,
            api_key: api_key.into(),
            write_host,
            read_host,
            timeout: None,
        })
    }

    /// Send every request to a single base URL (proxies, local mocks).
    pub fn with_host(mut self, host: &str) -> Result<Self, SearchIndexError> {
        let url = parse_host(host)?;
        self.write_host = url.clone();
        self.read_host = url;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_host(host: &str) -> Result<Url, SearchIndexError> {
    let url = Url::parse(host).map_err(|e| SearchIndexError::connection(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(SearchIndexError::connection(format!(
            "Host '{}' cannot be used as a base URL",
            host
        )));
    }
    Ok(url)
}

impl fmt::Debug for AlgoliaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgoliaConfig")
            .field("application_id", &self.application_id)
            .field("api_key", &"<redacted>")
            .field("write_host", &self.write_host.as_str())
            .field("read_host", &self.read_host.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hosts() {
        let config = AlgoliaConfig::new("APPID", "key").unwrap();
        assert_eq!(config.write_host.as_str(), "https://appid.algolia.net/");
        assert_eq!(config.read_host.as_str(), "https://appid-dsn.algolia.net/");
    }

    #[test]
    fn test_empty_application_id_rejected() {
        assert!(matches!(
            AlgoliaConfig::new("  ", "key"),
            Err(SearchIndexError::ValidationError(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AlgoliaConfig::new("APPID", "super-secret").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_with_host_overrides_both() {
        let config = AlgoliaConfig::new("APPID", "key")
            .unwrap()
            .with_host("http://127.0.0.1:9999")
            .unwrap();
        assert_eq!(config.write_host, config.read_host);
        assert_eq!(config.write_host.port(), Some(9999));
    }
}
