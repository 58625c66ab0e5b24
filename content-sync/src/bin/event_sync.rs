//! Incremental sync entry point.
//!
//! Reads one content-change event as JSON from stdin, for example
//! `{"collection":"post","operation":"update","keys":[42]}`, and applies it.
//! Batch hooks may send `records: [...]` instead of a single `record`.

use content_sync::telemetry::init_tracing;
use content_sync::{ContentSyncError, Dependencies, SyncError, SyncSettings};
use content_sync_shared::ContentEvent;
use dotenv::dotenv;
use tokio::io::AsyncReadExt;
use tracing::{error, info};

async fn read_event() -> Result<ContentEvent, ContentSyncError> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .map_err(|e| SyncError::parse(format!("Failed to read stdin: {}", e)))?;

    let event = serde_json::from_str(&input)
        .map_err(|e| SyncError::parse(format!("Invalid event payload: {}", e)))?;
    Ok(event)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ContentSyncError> {
    dotenv().ok();

    init_tracing("content-sync-event");

    let event = read_event().await.inspect_err(|e| {
        error!(error = %e, "Could not read event");
    })?;
    info!(
        collection = %event.collection,
        operation = ?event.operation,
        keys = event.keys.len(),
        records = event.payload_records().count(),
        "Received content event"
    );

    let settings = SyncSettings::from_env().inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    let mut deps = Dependencies::new(settings).inspect_err(|e| {
        error!(error = %e, "Failed to initialize dependencies");
    })?;

    let report = deps.orchestrator.handle_event(event).await;
    for unit in &report.units {
        info!(collection = %unit.unit, outcome = %unit.outcome, "Event handled");
    }
    Ok(())
}
