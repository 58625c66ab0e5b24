//! # Content Sync Shared
//!
//! Data structures passed between the stages of the content sync pipeline:
//! CMS-side collections, fields and records, the derived per-collection index
//! configuration, and the search documents written to the hosted index.

pub mod types;

pub use types::collection::{Collection, FieldDescriptor, FieldType};
pub use types::collection_config::{CollectionConfig, RankingDirective, SortOrder};
pub use types::content_event::{ContentEvent, EventOperation};
pub use types::record::{Record, RecordId};
pub use types::search_document::SearchDocument;
