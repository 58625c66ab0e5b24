//! Error types for the content sync pipeline.

use content_sync_repository::SearchIndexError;
use thiserror::Error;

/// Errors raised while talking to the CMS.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The CMS answered with an `errors` envelope.
    #[error("CMS API error: {0}")]
    Api(String),

    /// The CMS answered with a non-success status and no error envelope.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A request URL could not be built.
    #[error("URL error: {0}")]
    Url(String),
}

impl FetchError {
    /// Create an API error.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a URL error.
    pub fn url(msg: impl Into<String>) -> Self {
        Self::Url(msg.into())
    }
}

/// Errors that can occur while syncing one unit of work.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Reading from the CMS failed.
    #[error("Fetch error: {0}")]
    FetchError(#[from] FetchError),

    /// Writing to the search index failed.
    #[error("Index error: {0}")]
    IndexError(#[from] SearchIndexError),

    /// Error parsing an incoming event.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SyncError {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
