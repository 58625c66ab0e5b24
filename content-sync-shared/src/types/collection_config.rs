//! Per-collection index configuration derived from field metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction of a ranking directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A custom ranking directive such as `desc(date_created)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingDirective {
    pub field: String,
    pub order: SortOrder,
}

impl RankingDirective {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }
}

impl fmt::Display for RankingDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order {
            SortOrder::Asc => write!(f, "asc({})", self.field),
            SortOrder::Desc => write!(f, "desc({})", self.field),
        }
    }
}

/// Everything the pipeline needs to index one collection.
///
/// Derived deterministically from the collection name and its field
/// descriptors, so two derivations from the same schema are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Source collection name.
    pub collection: String,
    /// Target index name (several collections may share one index).
    pub index_name: String,
    /// Fields copied from records into documents. Deduplicated.
    pub fields: Vec<String>,
    /// Attributes the search service should match queries against.
    pub searchable_attributes: Vec<String>,
    /// Attributes exposed as facets.
    pub facetable_attributes: Vec<String>,
    /// Custom ranking, highest priority first.
    pub ranking: Vec<RankingDirective>,
    /// Set when the collection feeds the shared blocks index.
    pub block_type: Option<String>,
}

impl CollectionConfig {
    /// Whether records of this collection carry a `status` field.
    pub fn has_status_field(&self) -> bool {
        self.fields.iter().any(|f| f == "status")
    }
}
