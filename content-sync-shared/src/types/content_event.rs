//! Content-change events delivered by the CMS hooks.

use serde::{Deserialize, Serialize};

use crate::types::record::{Record, RecordId};

/// The kind of change that triggered an incremental sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOperation {
    #[serde(alias = "items.create")]
    Create,
    #[serde(alias = "items.update")]
    Update,
    #[serde(alias = "items.delete")]
    Delete,
}

/// A single create/update/delete notification for one collection.
///
/// `record` carries the item payload when the hook has it, `records` when a
/// batch hook delivers several items at once. `keys` carries the affected
/// primary keys (update and delete hooks may touch several items).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEvent {
    pub collection: String,
    pub operation: EventOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Record>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<RecordId>,
}

impl ContentEvent {
    /// A create or update event carrying the full record.
    pub fn upsert(collection: impl Into<String>, operation: EventOperation, record: Record) -> Self {
        Self {
            collection: collection.into(),
            operation,
            record: Some(record),
            records: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// A delete event for the given keys.
    pub fn delete(collection: impl Into<String>, keys: Vec<RecordId>) -> Self {
        Self {
            collection: collection.into(),
            operation: EventOperation::Delete,
            record: None,
            records: Vec::new(),
            keys,
        }
    }

    /// Payload records, single and batched, in delivery order.
    pub fn payload_records(&self) -> impl Iterator<Item = &Record> {
        self.record.iter().chain(self.records.iter())
    }

    /// Every key this event refers to. Explicit keys come first, then payload
    /// record ids not already listed.
    pub fn target_ids(&self) -> Vec<RecordId> {
        let mut ids = self.keys.clone();
        for id in self.payload_records().filter_map(Record::id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}
