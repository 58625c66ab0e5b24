//! Fetcher module for the content sync pipeline.
//!
//! Reads collections, field metadata and records from the CMS.

mod content_fetcher;
mod directus;

pub use content_fetcher::{ContentFetcher, ContentSource, StatusFilter};
pub use directus::DirectusClient;
