use crate::error::{OrderError, Result};
use std::io::IsTerminal;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global tracing subscriber.
///
/// Logs go to stderr so stdout stays reserved for the order listing.
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init(default_filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter));
    let filter = filter.map_err(|e| OrderError::ValidationError(format!("Invalid log filter: {e}")))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .map_err(|e| OrderError::InternalError(Box::new(e)))
}
