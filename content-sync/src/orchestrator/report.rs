//! Per-unit outcomes of a sync run.

use chrono::{DateTime, Utc};
use std::fmt;

/// Result of one unit of work: a collection in a bulk pass, or one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Succeeded { indexed: usize, deleted: usize },
    Skipped { reason: String },
    Failed { reason: String },
}

impl UnitOutcome {
    pub fn succeeded(indexed: usize, deleted: usize) -> Self {
        Self::Succeeded { indexed, deleted }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for UnitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded { indexed, deleted } => {
                write!(f, "succeeded (indexed {}, deleted {})", indexed, deleted)
            }
            Self::Skipped { reason } => write!(f, "skipped: {}", reason),
            Self::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Outcome of a single named unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub unit: String,
    pub outcome: UnitOutcome,
}

/// Aggregated outcomes of a bulk pass or an event.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub units: Vec<UnitReport>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            units: Vec::new(),
        }
    }

    pub fn record(&mut self, unit: impl Into<String>, outcome: UnitOutcome) {
        self.units.push(UnitReport {
            unit: unit.into(),
            outcome,
        });
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// Outcome recorded for a unit, if any.
    pub fn outcome(&self, unit: &str) -> Option<&UnitOutcome> {
        self.units
            .iter()
            .find(|u| u.unit == unit)
            .map(|u| &u.outcome)
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Succeeded { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(UnitOutcome::is_failed)
    }

    pub fn documents_indexed(&self) -> usize {
        self.units
            .iter()
            .map(|u| match u.outcome {
                UnitOutcome::Succeeded { indexed, .. } => indexed,
                _ => 0,
            })
            .sum()
    }

    pub fn documents_deleted(&self) -> usize {
        self.units
            .iter()
            .map(|u| match u.outcome {
                UnitOutcome::Succeeded { deleted, .. } => deleted,
                _ => 0,
            })
            .sum()
    }

    /// Milliseconds between start and finish, if finished.
    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }

    fn count(&self, predicate: impl Fn(&UnitOutcome) -> bool) -> usize {
        self.units.iter().filter(|u| predicate(&u.outcome)).count()
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::new()
    }
}
