use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Output encoding for the final order listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Settings {
    /// Input order commands CSV file
    pub input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "VENDOR_ORDERS_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Encoding of the final order listing written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv, env = "VENDOR_ORDERS_FORMAT")]
    pub format: OutputFormat,

    /// Synthetic delay in milliseconds applied before every mutation
    #[arg(long, default_value_t = 0, env = "VENDOR_ORDERS_LATENCY_MS")]
    pub latency_ms: u64,

    /// Log filter, overridden by RUST_LOG when set
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl Settings {
    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            simulated_latency: Duration::from_millis(self.latency_ms),
        }
    }
}

/// Tuning for [`crate::application::lifecycle::OrderLifecycleManager`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Delay applied before each mutation, standing in for a network round trip.
    pub simulated_latency: Duration,
}
