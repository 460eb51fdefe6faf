use crate::domain::order::Order;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OrderRow<'a> {
    tenant: &'a str,
    order: &'a str,
    status: &'static str,
    version: u64,
    items: usize,
    total: String,
}

impl<'a> From<&'a Order> for OrderRow<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            tenant: order.tenant().as_str(),
            order: order.id().as_str(),
            status: order.status().as_str(),
            version: order.version(),
            items: order.items().len(),
            total: order.total().to_string(),
        }
    }
}

/// Writes the final order listing as CSV.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, orders: &[Order]) -> Result<()> {
        if orders.is_empty() {
            self.writer
                .write_record(["tenant", "order", "status", "version", "items", "total"])?;
        }
        for order in orders {
            self.writer.serialize(OrderRow::from(order))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
