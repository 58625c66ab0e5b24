//! Advisory cache of derived collection configurations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use content_sync_shared::CollectionConfig;

/// A cached configuration together with the time it was derived.
///
/// Entries are never refreshed automatically, so a hit may describe a schema
/// that has since changed in the CMS. Callers that need the current schema
/// must re-derive.
#[derive(Debug, Clone)]
pub struct CachedConfig {
    pub config: Arc<CollectionConfig>,
    pub derived_at: DateTime<Utc>,
}

/// Collection name to derived configuration. No capacity, no TTL; entries
/// live until `invalidate` or `clear`. Dropping the whole cache is always
/// safe.
#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: HashMap<String, CachedConfig>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, collection: &str) -> Option<&CachedConfig> {
        self.entries.get(collection)
    }

    /// Store a freshly derived configuration, replacing any previous entry.
    pub fn insert(&mut self, config: CollectionConfig) -> Arc<CollectionConfig> {
        let config = Arc::new(config);
        self.entries.insert(
            config.collection.clone(),
            CachedConfig {
                config: Arc::clone(&config),
                derived_at: Utc::now(),
            },
        );
        config
    }

    pub fn invalidate(&mut self, collection: &str) -> bool {
        self.entries.remove(collection).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(collection: &str) -> CollectionConfig {
        CollectionConfig {
            collection: collection.to_string(),
            index_name: collection.to_string(),
            fields: vec!["id".to_string()],
            searchable_attributes: vec![],
            facetable_attributes: vec![],
            ranking: vec![],
            block_type: None,
        }
    }

    #[test]
    fn test_insert_get_invalidate() {
        let mut cache = ConfigCache::new();
        assert!(cache.get("pages").is_none());

        cache.insert(config("pages"));
        assert_eq!(cache.get("pages").unwrap().config.index_name, "pages");
        assert_eq!(cache.len(), 1);

        assert!(cache.invalidate("pages"));
        assert!(!cache.invalidate("pages"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_replaces_entry() {
        let mut cache = ConfigCache::new();
        cache.insert(config("pages"));
        let mut updated = config("pages");
        updated.fields.push("title".to_string());
        cache.insert(updated);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("pages").unwrap().config.fields.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut cache = ConfigCache::new();
        cache.insert(config("pages"));
        cache.insert(config("speaking"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
