//! Ingester configuration.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use wms_common::ColorScaleRegistry;

#[derive(Parser, Debug, Clone)]
#[command(name = "ingester")]
#[command(about = "Regenerate weather layer metadata from NetCDF datasets")]
pub struct Args {
    /// Directory holding `<parameter>_<run>.nc` datasets
    #[arg(long, env = "DATA_DIR", default_value = "/data/weather")]
    pub data_dir: PathBuf,

    /// Directory to publish metadata into (default: <DATA_DIR>/metadata)
    #[arg(long, env = "METADATA_DIR")]
    pub metadata_dir: Option<PathBuf>,

    /// Regenerate every N seconds instead of once
    #[arg(long, env = "REGENERATE_INTERVAL_SECS")]
    pub interval_secs: Option<u64>,

    /// YAML color scale table replacing the built-in one
    #[arg(long, env = "COLOR_SCALES_FILE")]
    pub color_scales_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this address while running
    #[arg(long, env = "METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn metadata_dir(&self) -> PathBuf {
        self.metadata_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("metadata"))
    }

    /// Regeneration period; `None` (or zero) runs once.
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn color_scales(&self) -> Result<ColorScaleRegistry> {
        match &self.color_scales_file {
            Some(path) => ColorScaleRegistry::from_yaml_file(path)
                .with_context(|| format!("loading color scales from {}", path.display())),
            None => Ok(ColorScaleRegistry::builtin()),
        }
    }
}
