//! Search index error types.
//!
//! This module defines the unified error type for all search index
//! operations, covering transport failures, rejected requests and malformed
//! responses.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait and the pipeline's index writer.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., empty index name or object ID).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the search service or build a request URL.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to update index settings.
    #[error("Settings error: {0}")]
    SettingsError(String),

    /// Failed to save one or more documents.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Batch operation was rejected as a whole.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to delete a document.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Failed to browse documents of an index.
    #[error("Browse error: {0}")]
    BrowseError(String),

    /// Failed to parse a response from the search service.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a settings error.
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::SettingsError(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create a delete error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    /// Create a browse error.
    pub fn browse(msg: impl Into<String>) -> Self {
        Self::BrowseError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}
