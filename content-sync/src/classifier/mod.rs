//! Classifier module for the content sync pipeline.
//!
//! Decides which collections are indexed, where they go, and which of their
//! fields are searchable, facetable or copied verbatim.

mod config_cache;
mod schema_classifier;

pub use config_cache::{CachedConfig, ConfigCache};
pub use schema_classifier::{
    block_type_for, derive_ranking, index_name_for, is_excluded, Classification,
    SchemaClassifier, BLOCKS_INDEX,
};
