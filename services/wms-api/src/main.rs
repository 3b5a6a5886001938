//! Weather layer API server.
//!
//! Serves published layer metadata, capabilities, rendered PNG tiles and a
//! WMS facade over HTTP.

use anyhow::Result;
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use wms_api::config::Args;
use wms_api::state::AppState;

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics exporter initialized");

    let state = Arc::new(AppState::from_args(&args));
    info!(
        data_dir = %state.data_dir.display(),
        metadata_dir = %state.store.dir().display(),
        worker_threads = ?args.worker_threads,
        "Starting weather layer API server"
    );

    let app = wms_api::app(state, prometheus_handle);

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
