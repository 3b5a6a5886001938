//! Weather layer metadata regeneration.
//!
//! Scans a dataset directory of NetCDF files, extracts per-file metadata
//! and publishes layer histories plus a registry index. Runs once, or on a
//! fixed interval with `--interval-secs`.

mod config;
mod schedule;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::Args;
use ingestion::Ingester;
use schedule::Target;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(addr) = args.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!(address = %addr, "Prometheus metrics exporter listening");
    }

    let registry = args.color_scales()?;
    info!(
        color_scales = registry.len(),
        custom = args.color_scales_file.is_some(),
        "Loaded color scale registry"
    );

    let ingester = Arc::new(Ingester::new(Arc::new(registry)));
    let target = Target {
        data_dir: args.data_dir.clone(),
        metadata_dir: args.metadata_dir(),
    };
    info!(
        data_dir = %target.data_dir.display(),
        metadata_dir = %target.metadata_dir.display(),
        "Starting weather metadata ingester"
    );

    match args.interval() {
        Some(period) => schedule::run_every(ingester, target, period).await,
        None => {
            let report = schedule::run_once(ingester, target).await?;
            info!(
                parameters = ?report.parameters,
                records = report.records,
                failures = report.failures.len(),
                "Regeneration complete"
            );
            Ok(())
        }
    }
}
