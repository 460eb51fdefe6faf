use crate::domain::order::Order;
use crate::error::{OrderError, Result};
use std::io::Write;

/// Writes the final order listing as a pretty-printed JSON array.
pub fn write_orders<W: Write>(sink: W, orders: &[Order]) -> Result<()> {
    serde_json::to_writer_pretty(sink, orders).map_err(|e| OrderError::InternalError(Box::new(e)))
}
