//! Core data structures shared across the content sync pipeline.

pub mod collection;
pub mod collection_config;
pub mod content_event;
pub mod record;
pub mod search_document;

pub use collection::{Collection, FieldDescriptor, FieldType};
pub use collection_config::{CollectionConfig, RankingDirective, SortOrder};
pub use content_event::{ContentEvent, EventOperation};
pub use record::{Record, RecordId};
pub use search_document::SearchDocument;
