//! Algolia implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! speaking the Algolia REST API over `reqwest`.

mod config;
mod provider;

pub use config::AlgoliaConfig;
pub use provider::AlgoliaProvider;
