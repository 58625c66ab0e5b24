//! # Content Sync
//!
//! Keeps hosted search indices consistent with the content of a headless
//! CMS, either by a full bulk pass or by applying single content-change
//! events.
//!
//! ## Architecture
//!
//! The pipeline follows the Fetcher-Processor-Loader pattern:
//!
//! 1. **Fetcher**: Reads collections, fields and records from the CMS
//! 2. **Classifier**: Derives per-collection index configuration
//! 3. **Processor**: Transforms records into search documents
//! 4. **Loader**: Writes settings and documents to the search index
//! 5. **Orchestrator**: Coordinates bulk passes and events
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`fetcher`]: CMS access
//! - [`classifier`]: Field classification and index routing
//! - [`processor`]: Record to document transformation
//! - [`loader`]: Index writes and stale cleanup
//! - [`orchestrator`]: Bulk and incremental flows, sync reports
//! - [`telemetry`]: Tracing setup for the binaries
//! - [`errors`]: Error types for the pipeline

pub mod classifier;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod telemetry;

pub use config::{Dependencies, SyncSettings};
pub use errors::SyncError;
pub use orchestrator::{SyncOrchestrator, SyncReport, UnitOutcome};

use thiserror::Error;

/// Errors that can occur during startup or a run.
#[derive(Error, Debug)]
pub enum ContentSyncError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Sync error.
    #[error("Sync error: {0}")]
    SyncError(#[from] SyncError),
}

impl ContentSyncError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
