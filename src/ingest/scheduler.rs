//! Periodic trigger for ingestion runs

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{error, info};

use crate::ingest::coordinator::{IngestionCoordinator, RunSummary};
use crate::ingest::error::IngestError;

/// Run once, giving up after `run_timeout`.
///
/// Items not reached before the timeout are picked up by the next run; the
/// dedup gate makes re-processing them harmless.
pub async fn run_with_timeout(
    coordinator: &IngestionCoordinator,
    run_timeout: Duration,
) -> Result<RunSummary, IngestError> {
    match timeout(run_timeout, coordinator.run()).await {
        Ok(result) => result,
        Err(_) => {
            let millis = run_timeout.as_millis() as u64;
            error!("Scheduled handler: run timed out after {} ms", millis);
            Err(IngestError::Timeout(millis))
        }
    }
}

/// Trigger a run every `period` until the task is dropped.
///
/// Runs never overlap; ticks missed while a run is in progress are skipped.
pub async fn run_schedule(
    coordinator: Arc<IngestionCoordinator>,
    period: Duration,
    run_timeout: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Scheduler started with period {:?}", period);
    loop {
        ticker.tick().await;
        if let Err(e) = run_with_timeout(&coordinator, run_timeout).await {
            error!("Scheduled handler: Error in scheduled task: {}", e);
        }
    }
}
