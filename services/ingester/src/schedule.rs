//! One-shot and periodic regeneration.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use ingestion::{Ingester, RegenerationReport};

/// Where a regeneration reads from and publishes to.
#[derive(Debug, Clone)]
pub struct Target {
    pub data_dir: PathBuf,
    pub metadata_dir: PathBuf,
}

/// Run one regeneration on the blocking pool.
pub async fn run_once(ingester: Arc<Ingester>, target: Target) -> Result<RegenerationReport> {
    let report = tokio::task::spawn_blocking(move || {
        ingester.regenerate(&target.data_dir, &target.metadata_dir)
    })
    .await??;

    for failure in &report.failures {
        warn!(file = %failure.file.display(), error = %failure.error, "Dataset skipped");
    }
    Ok(report)
}

/// Regenerate every `period` until interrupted. A failed run is logged and
/// retried at the next tick.
pub async fn run_every(ingester: Arc<Ingester>, target: Target, period: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match run_once(ingester.clone(), target.clone()).await {
                    Ok(report) => info!(
                        parameters = report.parameters.len(),
                        records = report.records,
                        failures = report.failures.len(),
                        next_in_secs = period.as_secs(),
                        "Regeneration cycle complete"
                    ),
                    Err(e) => error!(error = %e, "Regeneration cycle failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                return Ok(());
            }
        }
    }
}
