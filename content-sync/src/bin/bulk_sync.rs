//! Bulk sync entry point.
//!
//! Resyncs every indexable CMS collection into its search index. Takes no
//! arguments; all configuration comes from the environment.

use content_sync::telemetry::init_tracing;
use content_sync::{ContentSyncError, Dependencies, SyncSettings};
use dotenv::dotenv;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ContentSyncError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing("content-sync-bulk");

    info!("Starting bulk content sync");

    let settings = SyncSettings::from_env().inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    let mut deps = Dependencies::new(settings).inspect_err(|e| {
        error!(error = %e, "Failed to initialize dependencies");
    })?;

    if let Err(e) = deps.orchestrator.check_connections().await {
        error!(error = %e, "Connection check failed, aborting");
        return Err(e.into());
    }
    info!("CMS and search service reachable");

    let report = deps.orchestrator.run_bulk().await;

    for unit in report.units.iter().filter(|u| u.outcome.is_failed()) {
        warn!(collection = %unit.unit, outcome = %unit.outcome, "Collection not synced");
    }
    info!(
        collections = report.units.len(),
        failed = report.failed(),
        indexed = report.documents_indexed(),
        deleted = report.documents_deleted(),
        "Bulk content sync finished"
    );
    Ok(())
}
