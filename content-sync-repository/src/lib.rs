//! # Content Sync Repository
//!
//! Traits and implementations for writing to the hosted search index. It
//! defines the error type, the `SearchIndexProvider` interface the pipeline
//! is written against, and a concrete implementation for Algolia's REST API.

pub mod algolia;
pub mod errors;
pub mod interfaces;
pub mod types;

pub use algolia::{AlgoliaConfig, AlgoliaProvider};
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use types::{BatchOperationResult, BatchOperationSummary, IndexSettings};
