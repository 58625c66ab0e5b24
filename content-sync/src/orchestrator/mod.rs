//! Orchestrator module for the content sync pipeline.
//!
//! Coordinates the fetcher, classifier, processor, and loader components for
//! bulk passes and incremental events.

mod report;

pub use report::{SyncReport, UnitOutcome, UnitReport};

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::classifier::{index_name_for, is_excluded, ConfigCache, SchemaClassifier};
use crate::errors::SyncError;
use crate::fetcher::{ContentFetcher, StatusFilter};
use crate::loader::IndexWriter;
use crate::processor::{DocumentTransformer, ProcessedRecord};
use content_sync_shared::{
    CollectionConfig, ContentEvent, EventOperation, Record, RecordId, SearchDocument,
};

/// Where the orchestrator is in its current unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Discovering,
    Configuring,
    Transforming,
    Writing,
    HandlingEvent,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Configuring => "configuring",
            Self::Transforming => "transforming",
            Self::Writing => "writing",
            Self::HandlingEvent => "handling_event",
        };
        f.write_str(name)
    }
}

/// Records of one collection after the publication policy was applied.
#[derive(Debug, Default)]
struct TransformedBatch {
    documents: Vec<SearchDocument>,
    unpublished: Vec<String>,
    skipped: usize,
}

impl TransformedBatch {
    fn from_processed(processed: Vec<ProcessedRecord>) -> Self {
        let mut batch = Self::default();
        for record in processed {
            match record {
                ProcessedRecord::Index(document) => batch.documents.push(document),
                ProcessedRecord::Delete { object_id } => batch.unpublished.push(object_id),
                ProcessedRecord::Skip { reason } => {
                    debug!(reason = %reason, "Skipped record");
                    batch.skipped += 1;
                }
            }
        }
        batch
    }
}

/// Orchestrator that drives the sync pipeline.
///
/// The orchestrator:
/// - Runs bulk passes over every indexable collection
/// - Applies single content-change events
/// - Keeps the advisory config cache
/// - Turns every per-unit failure into a report entry instead of aborting
///
/// It holds no state between units of work apart from the config cache; all
/// state of record lives in the CMS and the search index.
pub struct SyncOrchestrator {
    fetcher: ContentFetcher,
    classifier: SchemaClassifier,
    transformer: DocumentTransformer,
    writer: IndexWriter,
    cache: ConfigCache,
    state: SyncState,
}

impl SyncOrchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        fetcher: ContentFetcher,
        classifier: SchemaClassifier,
        transformer: DocumentTransformer,
        writer: IndexWriter,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            transformer,
            writer,
            cache: ConfigCache::new(),
            state: SyncState::Idle,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Drop every cached collection config, forcing re-derivation.
    pub fn clear_config_cache(&mut self) {
        let dropped = self.cache.len();
        self.cache.clear();
        info!(dropped = dropped, "Cleared collection config cache");
    }

    /// Drop the cached config of one collection.
    pub fn invalidate_config(&mut self, collection: &str) -> bool {
        self.cache.invalidate(collection)
    }

    /// Check that both the CMS and the search service answer.
    pub async fn check_connections(&self) -> Result<(), SyncError> {
        self.writer.check_ready().await?;
        self.fetcher.check_connection().await?;
        Ok(())
    }

    /// Resync every indexable collection.
    ///
    /// Collections are processed one at a time; a failure in one is recorded
    /// and the pass continues with the next.
    #[instrument(skip(self))]
    pub async fn run_bulk(&mut self) -> SyncReport {
        let mut report = SyncReport::new();

        self.transition(SyncState::Discovering);
        let collections = self.fetcher.list_collections().await;
        info!(count = collections.len(), "Starting bulk pass");

        for collection in collections {
            let outcome = self.sync_collection(&collection.name).await;
            Self::log_outcome(&collection.name, &outcome);
            report.record(collection.name, outcome);
        }

        self.transition(SyncState::Idle);
        let report = report.finish();
        info!(
            succeeded = report.succeeded(),
            skipped = report.skipped(),
            failed = report.failed(),
            indexed = report.documents_indexed(),
            deleted = report.documents_deleted(),
            duration_ms = ?report.duration_ms(),
            "Bulk pass complete"
        );
        report
    }

    /// Resync one collection: configure, fetch, transform, clean, upsert.
    #[instrument(skip(self))]
    pub async fn sync_collection(&mut self, collection: &str) -> UnitOutcome {
        let outcome = match self.try_sync_collection(collection).await {
            Ok(outcome) => outcome,
            Err(e) => UnitOutcome::failed(e.to_string()),
        };
        self.transition(SyncState::Idle);
        outcome
    }

    async fn try_sync_collection(&mut self, collection: &str) -> Result<UnitOutcome, SyncError> {
        self.transition(SyncState::Configuring);
        let Some(config) = self.derive_config(collection).await else {
            return Ok(UnitOutcome::skipped("collection is excluded or has no fields"));
        };
        self.writer.configure(&config).await?;

        let filter = if config.has_status_field() {
            StatusFilter::PublishedOnly
        } else {
            StatusFilter::Any
        };
        let records = self
            .fetcher
            .fetch_records(collection, &config.fields, filter)
            .await?;
        info!(count = records.len(), "Fetched records");

        self.transition(SyncState::Transforming);
        let batch = TransformedBatch::from_processed(
            self.transformer.process_batch(collection, &records, &config),
        );

        self.transition(SyncState::Writing);
        let keep: HashSet<String> = batch
            .documents
            .iter()
            .map(|d| d.object_id.clone())
            .collect();

        let mut cleanup_error = None;
        let deleted = match self
            .writer
            .clean_stale(&config.index_name, collection, &keep)
            .await
        {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(error = %e, "Stale cleanup failed, removing unpublished records only");
                cleanup_error = Some(e);
                if batch.unpublished.is_empty() {
                    0
                } else {
                    self.writer
                        .delete_many(&config.index_name, &batch.unpublished)
                        .await?
                        .succeeded
                }
            }
        };

        let summary = self
            .writer
            .upsert_many(&config.index_name, &batch.documents)
            .await?;

        if summary.failed > 0 {
            return Ok(UnitOutcome::failed(format!(
                "{} of {} documents rejected",
                summary.failed, summary.total
            )));
        }
        if let Some(e) = cleanup_error {
            return Ok(UnitOutcome::failed(format!("stale cleanup failed: {}", e)));
        }

        Ok(UnitOutcome::succeeded(summary.succeeded, deleted))
    }

    /// Apply one content-change event.
    #[instrument(skip(self, event), fields(collection = %event.collection, operation = ?event.operation))]
    pub async fn handle_event(&mut self, event: ContentEvent) -> SyncReport {
        let mut report = SyncReport::new();
        self.transition(SyncState::HandlingEvent);

        let outcome = if is_excluded(&event.collection) {
            UnitOutcome::skipped("collection is excluded")
        } else {
            let result = match event.operation {
                EventOperation::Delete => self.apply_delete(&event).await,
                EventOperation::Create | EventOperation::Update => self.apply_upsert(&event).await,
            };
            result.unwrap_or_else(|e| UnitOutcome::failed(e.to_string()))
        };

        Self::log_outcome(&event.collection, &outcome);
        report.record(event.collection, outcome);
        self.transition(SyncState::Idle);
        report.finish()
    }

    async fn apply_delete(&self, event: &ContentEvent) -> Result<UnitOutcome, SyncError> {
        let object_ids: Vec<String> = event
            .target_ids()
            .iter()
            .map(|id| SearchDocument::object_id_for(&event.collection, id))
            .collect();
        let index = index_name_for(&event.collection);

        match object_ids.as_slice() {
            [] => Ok(UnitOutcome::skipped("delete event carries no keys")),
            [object_id] => {
                self.writer.delete_one(&index, object_id).await?;
                Ok(UnitOutcome::succeeded(0, 1))
            }
            _ => {
                let summary = self.writer.delete_many(&index, &object_ids).await?;
                if summary.failed > 0 {
                    return Ok(UnitOutcome::failed(format!(
                        "{} of {} deletions failed",
                        summary.failed, summary.total
                    )));
                }
                Ok(UnitOutcome::succeeded(0, summary.succeeded))
            }
        }
    }

    async fn apply_upsert(&mut self, event: &ContentEvent) -> Result<UnitOutcome, SyncError> {
        let collection = event.collection.as_str();
        let Some(config) = self.config_for(collection).await else {
            return Ok(UnitOutcome::skipped("collection is excluded or has no fields"));
        };

        let targets = self.resolve_records(event).await?;
        if targets.is_empty() {
            return Ok(UnitOutcome::skipped("event carries no record and no keys"));
        }

        let mut documents = Vec::new();
        let mut removals = Vec::new();
        let mut skipped = 0;
        for (id, record) in targets {
            match record {
                Some(record) => match self.transformer.process_record(collection, &record, &config) {
                    ProcessedRecord::Index(document) => documents.push(document),
                    ProcessedRecord::Delete { object_id } => removals.push(object_id),
                    ProcessedRecord::Skip { .. } => skipped += 1,
                },
                None => {
                    debug!(id = %id, "Record no longer exists, removing from index");
                    removals.push(SearchDocument::object_id_for(collection, &id));
                }
            }
        }

        if documents.is_empty() && removals.is_empty() {
            return Ok(UnitOutcome::skipped(format!("{} record(s) without id", skipped)));
        }

        for object_id in &removals {
            self.writer.delete_one(&config.index_name, object_id).await?;
        }
        let summary = self
            .writer
            .upsert_many(&config.index_name, &documents)
            .await?;
        if summary.failed > 0 {
            return Ok(UnitOutcome::failed(format!(
                "{} of {} documents rejected",
                summary.failed, summary.total
            )));
        }

        Ok(UnitOutcome::succeeded(summary.succeeded, removals.len()))
    }

    /// Full records an upsert event refers to.
    ///
    /// Payload records with an id (single or batched) are used as-is. Keys
    /// without a payload record are read back from the CMS; `None` means the
    /// record no longer exists.
    async fn resolve_records(
        &self,
        event: &ContentEvent,
    ) -> Result<Vec<(RecordId, Option<Record>)>, SyncError> {
        let mut resolved: Vec<(RecordId, Option<Record>)> = Vec::new();
        for record in event.payload_records() {
            if let Some(id) = record.id() {
                if !resolved.iter().any(|(known, _)| *known == id) {
                    resolved.push((id, Some(record.clone())));
                }
            }
        }

        for key in &event.keys {
            if resolved.iter().any(|(known, _)| known == key) {
                continue;
            }
            let record = self
                .fetcher
                .fetch_record(&event.collection, key)
                .await?
                .map(|mut record| {
                    if record.id().is_none() {
                        record.insert("id", serde_json::to_value(key).unwrap_or_default());
                    }
                    record
                });
            resolved.push((key.clone(), record));
        }
        Ok(resolved)
    }

    /// Derive a fresh config and refresh the cache with it.
    async fn derive_config(&mut self, collection: &str) -> Option<Arc<CollectionConfig>> {
        let fields = self.fetcher.list_fields(collection).await;
        let config = self.classifier.build_config(collection, &fields)?;
        Some(self.cache.insert(config))
    }

    /// Cached config, derived on a miss.
    async fn config_for(&mut self, collection: &str) -> Option<Arc<CollectionConfig>> {
        if let Some(cached) = self.cache.get(collection) {
            debug!(derived_at = %cached.derived_at, "Using cached collection config");
            return Some(Arc::clone(&cached.config));
        }
        self.derive_config(collection).await
    }

    fn transition(&mut self, next: SyncState) {
        debug!(from = %self.state, to = %next, "State transition");
        self.state = next;
    }

    fn log_outcome(unit: &str, outcome: &UnitOutcome) {
        match outcome {
            UnitOutcome::Succeeded { indexed, deleted } => {
                info!(collection = %unit, indexed = indexed, deleted = deleted, "Synced")
            }
            UnitOutcome::Skipped { reason } => {
                info!(collection = %unit, reason = %reason, "Skipped")
            }
            UnitOutcome::Failed { reason } => {
                error!(collection = %unit, error = %reason, "Sync failed")
            }
        }
    }
}
