//! Field classification and index routing.

use tracing::{debug, instrument};

use content_sync_shared::{CollectionConfig, FieldDescriptor, FieldType, RankingDirective};

/// System and junction collections that are never indexed.
const EXCLUDED_COLLECTIONS: &[&str] = &[
    "directus_access",
    "directus_activity",
    "directus_collections",
    "directus_comments",
    "directus_fields",
    "directus_files",
    "directus_folders",
    "directus_migrations",
    "directus_permissions",
    "directus_policies",
    "directus_presets",
    "directus_relations",
    "directus_revisions",
    "directus_roles",
    "directus_sessions",
    "directus_settings",
    "directus_users",
    "directus_webhooks",
    "directus_dashboards",
    "directus_panels",
    "directus_notifications",
    "directus_shares",
    "directus_flows",
    "directus_operations",
    "directus_translations",
    "directus_versions",
    "directus_extensions",
    "post_tags",
    "junctions",
];

/// Prefix reserved for CMS system collections.
const SYSTEM_PREFIX: &str = "directus_";

/// Prefix of the page-builder block collections.
const BLOCK_PREFIX: &str = "block_";

/// Shared index receiving every `block_*` collection.
pub const BLOCKS_INDEX: &str = "blocks";

const SEARCHABLE_TYPES: &[FieldType] = &[
    FieldType::String,
    FieldType::Text,
    FieldType::Uuid,
    FieldType::Hash,
    FieldType::Json,
];

const FACETABLE_TYPES: &[FieldType] = &[
    FieldType::String,
    FieldType::Uuid,
    FieldType::Boolean,
    FieldType::Integer,
    FieldType::Float,
    FieldType::Decimal,
];

const SEARCHABLE_KEYWORDS: &[&str] = &[
    "title",
    "name",
    "headline",
    "content",
    "excerpt",
    "description",
    "event_name",
];

const FACETABLE_KEYWORDS: &[&str] = &["status", "type", "category", "tag"];

/// Fields copied into every document when the collection has them.
const CORE_FIELDS: &[&str] = &[
    "id",
    "title",
    "name",
    "slug",
    "status",
    "date_created",
    "date_updated",
];

/// Candidate ranking fields, highest priority first.
const RANKING_FIELDS: &[&str] = &["date_created", "date_updated", "date"];

/// Whether a collection is excluded from indexing.
pub fn is_excluded(collection: &str) -> bool {
    EXCLUDED_COLLECTIONS.contains(&collection) || collection.starts_with(SYSTEM_PREFIX)
}

/// Target index of a collection: `block_*` share `blocks`, `post` goes to
/// `posts`, anything else keeps its own name.
pub fn index_name_for(collection: &str) -> String {
    if collection.starts_with(BLOCK_PREFIX) {
        BLOCKS_INDEX.to_string()
    } else if collection == "post" {
        "posts".to_string()
    } else {
        collection.to_string()
    }
}

/// Block type tag for collections that feed the shared blocks index.
pub fn block_type_for(collection: &str) -> Option<String> {
    collection.strip_prefix(BLOCK_PREFIX).map(str::to_string)
}

/// Rank by the first available date field, newest first.
pub fn derive_ranking(fields: &[FieldDescriptor]) -> Vec<RankingDirective> {
    RANKING_FIELDS
        .iter()
        .find(|candidate| fields.iter().any(|f| f.name == **candidate))
        .map(|field| vec![RankingDirective::desc(*field)])
        .unwrap_or_default()
}

fn name_matches(field: &FieldDescriptor, keywords: &[&str]) -> bool {
    let name = field.name.to_lowercase();
    keywords.iter().any(|keyword| name.contains(keyword))
}

/// Result of classifying a collection's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub searchable: Vec<String>,
    pub facetable: Vec<String>,
    pub core_fields: Vec<String>,
}

impl Classification {
    /// Union of core, searchable and facetable fields without duplicates.
    pub fn index_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for field in self
            .core_fields
            .iter()
            .chain(&self.searchable)
            .chain(&self.facetable)
        {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
        fields
    }
}

/// Derives index configuration from field metadata.
#[derive(Debug, Clone, Default)]
pub struct SchemaClassifier;

impl SchemaClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Split fields into searchable, facetable and core sets.
    pub fn classify(&self, fields: &[FieldDescriptor]) -> Classification {
        let searchable = fields
            .iter()
            .filter(|f| SEARCHABLE_TYPES.contains(&f.field_type))
            .filter(|f| !f.hidden)
            .filter(|f| name_matches(f, SEARCHABLE_KEYWORDS))
            .map(|f| f.name.clone())
            .collect();

        let facetable = fields
            .iter()
            .filter(|f| FACETABLE_TYPES.contains(&f.field_type))
            .filter(|f| !f.hidden)
            .filter(|f| name_matches(f, FACETABLE_KEYWORDS))
            .map(|f| f.name.clone())
            .collect();

        let core_fields = CORE_FIELDS
            .iter()
            .filter(|core| fields.iter().any(|f| f.name == **core))
            .map(|core| core.to_string())
            .collect();

        Classification {
            searchable,
            facetable,
            core_fields,
        }
    }

    /// Build the full configuration for a collection.
    ///
    /// Returns `None` for excluded collections and for collections with no
    /// fields at all.
    #[instrument(skip(self, fields), fields(field_count = fields.len()))]
    pub fn build_config(
        &self,
        collection: &str,
        fields: &[FieldDescriptor],
    ) -> Option<CollectionConfig> {
        if is_excluded(collection) || fields.is_empty() {
            return None;
        }

        let classification = self.classify(fields);
        let config = CollectionConfig {
            collection: collection.to_string(),
            index_name: index_name_for(collection),
            fields: classification.index_fields(),
            searchable_attributes: classification.searchable,
            facetable_attributes: classification.facetable,
            ranking: derive_ranking(fields),
            block_type: block_type_for(collection),
        };

        debug!(
            collection = %collection,
            index = %config.index_name,
            fields = config.fields.len(),
            searchable = config.searchable_attributes.len(),
            facetable = config.facetable_attributes.len(),
            "Generated collection config"
        );
        Some(config)
    }
}
