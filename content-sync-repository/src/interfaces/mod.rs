//! Interface definitions for the search index provider.
//!
//! The `SearchIndexProvider` trait allows the hosted search backend to be
//! swapped for an in-memory implementation in tests.

mod search_index_provider;

pub use search_index_provider::SearchIndexProvider;
