use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::warn;
use vendor_orders::application::batch::CommandProcessor;
use vendor_orders::application::lifecycle::OrderLifecycleManager;
use vendor_orders::config::{OutputFormat, Settings};
use vendor_orders::domain::ports::OrderStoreBox;
use vendor_orders::infrastructure::in_memory::InMemoryOrderStore;
use vendor_orders::interfaces::csv::command_reader::CommandReader;
use vendor_orders::interfaces::csv::order_writer::OrderWriter;
use vendor_orders::interfaces::json;
use vendor_orders::telemetry;

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<&Path>) -> Result<OrderStoreBox> {
    use vendor_orders::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using persistent storage");
            Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?))
        }
        None => Ok(Box::new(InMemoryOrderStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<&Path>) -> Result<OrderStoreBox> {
    if db_path.is_some() {
        warn!(
            "persistent storage requested via --db-path, but the 'storage-rocksdb' feature is not enabled; falling back to in-memory storage"
        );
    }
    Ok(Box::new(InMemoryOrderStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();
    telemetry::init(&settings.log).into_diagnostic()?;

    let store = open_store(settings.db_path.as_deref())?;
    let manager = OrderLifecycleManager::with_config(store, settings.lifecycle());
    let mut processor = CommandProcessor::new(manager);

    let file = File::open(&settings.input).into_diagnostic()?;
    for command in CommandReader::new(file).commands() {
        match command {
            Ok(command) => {
                if let Err(e) = processor.apply(command).await {
                    if !e.is_recoverable() {
                        return Err(e).into_diagnostic();
                    }
                    warn!(error = %e, "rejected command");
                }
            }
            Err(e) => warn!(error = %e, "malformed command row"),
        }
    }

    if processor.pending_carts() > 0 {
        warn!(
            carts = processor.pending_carts(),
            "discarding carts that were never submitted"
        );
    }

    let orders = processor.into_results().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match settings.format {
        OutputFormat::Csv => OrderWriter::new(&mut out).write_orders(&orders),
        OutputFormat::Json => json::write_orders(&mut out, &orders),
    }
    .into_diagnostic()?;
    if settings.format == OutputFormat::Json {
        writeln!(out).into_diagnostic()?;
    }

    Ok(())
}
