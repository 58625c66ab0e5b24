//! Process settings read once at startup.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::loader::DEFAULT_BATCH_SIZE;
use crate::ContentSyncError;

/// Settings for one process run.
///
/// Built once from the environment and handed to [`super::Dependencies`];
/// nothing reads the environment after that.
#[derive(Clone)]
pub struct SyncSettings {
    pub directus_url: String,
    pub directus_token: String,
    pub algolia_application_id: String,
    pub algolia_api_key: String,
    /// Replaces the standard search hosts when set.
    pub algolia_host: Option<String>,
    pub batch_size: usize,
    pub http_timeout: Option<Duration>,
}

impl SyncSettings {
    /// Read settings from process environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DIRECTUS_URL`: CMS base URL (required)
    /// - `DIRECTUS_TOKEN`: CMS access token (required)
    /// - `ALGOLIA_APPLICATION_ID`: Search application ID (required)
    /// - `ALGOLIA_ADMIN_API_KEY`: Search admin key (required)
    /// - `ALGOLIA_HOST`: Override for the search hosts (optional)
    /// - `SYNC_BATCH_SIZE`: Documents per batch write (default: 1000)
    /// - `SYNC_HTTP_TIMEOUT_SECS`: HTTP timeout in seconds (default: client default)
    pub fn from_env() -> Result<Self, ContentSyncError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ContentSyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ContentSyncError::config(format!("{} is not set", key)))
        };

        let batch_size = parse_optional::<usize>(&lookup, "SYNC_BATCH_SIZE")?
            .unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(ContentSyncError::config(
                "SYNC_BATCH_SIZE must be greater than zero",
            ));
        }

        let http_timeout =
            parse_optional::<u64>(&lookup, "SYNC_HTTP_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(Self {
            directus_url: required("DIRECTUS_URL")?,
            directus_token: required("DIRECTUS_TOKEN")?,
            algolia_application_id: required("ALGOLIA_APPLICATION_ID")?,
            algolia_api_key: required("ALGOLIA_ADMIN_API_KEY")?,
            algolia_host: lookup("ALGOLIA_HOST").filter(|host| !host.trim().is_empty()),
            batch_size,
            http_timeout,
        })
    }
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ContentSyncError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ContentSyncError::config(format!("Invalid {} '{}': {}", key, raw, e))),
    }
}

impl fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSettings")
            .field("directus_url", &self.directus_url)
            .field("directus_token", &"<redacted>")
            .field("algolia_application_id", &self.algolia_application_id)
            .field("algolia_api_key", &"<redacted>")
            .field("algolia_host", &self.algolia_host)
            .field("batch_size", &self.batch_size)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("DIRECTUS_URL", "https://cms.example.com"),
        ("DIRECTUS_TOKEN", "token"),
        ("ALGOLIA_APPLICATION_ID", "APPID"),
        ("ALGOLIA_ADMIN_API_KEY", "secret"),
    ];

    #[test]
    fn test_defaults() {
        let settings = SyncSettings::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(settings.directus_url, "https://cms.example.com");
        assert_eq!(settings.batch_size, 1000);
        assert!(settings.http_timeout.is_none());
        assert!(settings.algolia_host.is_none());
    }

    #[test]
    fn test_optional_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SYNC_BATCH_SIZE", "250"));
        pairs.push(("SYNC_HTTP_TIMEOUT_SECS", " 30 "));
        let settings = SyncSettings::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(settings.batch_size, 250);
        assert_eq!(settings.http_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_required_key() {
        let pairs: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != "DIRECTUS_TOKEN")
            .collect();
        let err = SyncSettings::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("DIRECTUS_TOKEN"));
    }

    #[test]
    fn test_blank_required_key_is_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("DIRECTUS_URL", "  ");
        assert!(SyncSettings::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_invalid_numbers() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SYNC_BATCH_SIZE", "lots"));
        assert!(SyncSettings::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SYNC_BATCH_SIZE", "0"));
        assert!(SyncSettings::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = SyncSettings::from_lookup(lookup(&REQUIRED)).unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("secret"));
        assert!(!debug.contains("\"token\""));
    }
}
