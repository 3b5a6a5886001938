//! Command-line and environment configuration.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "wms-api")]
#[command(about = "Weather layer metadata and tile rendering API server")]
pub struct Args {
    /// Listen address
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Directory holding `<parameter>_<run>.nc` datasets
    #[arg(long, env = "DATA_DIR", default_value = "/data/weather")]
    pub data_dir: PathBuf,

    /// Directory holding published metadata (default: <DATA_DIR>/metadata)
    #[arg(long, env = "METADATA_DIR")]
    pub metadata_dir: Option<PathBuf>,

    /// Base URL advertised in capabilities documents
    #[arg(long, env = "PUBLIC_URL", default_value = "http://localhost:8080")]
    pub public_url: String,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long, env = "TOKIO_WORKER_THREADS")]
    pub worker_threads: Option<usize>,
}

impl Args {
    pub fn metadata_dir(&self) -> PathBuf {
        self.metadata_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("metadata"))
    }
}
