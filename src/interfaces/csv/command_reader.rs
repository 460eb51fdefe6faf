use crate::domain::command::OrderCommand;
use crate::domain::order::{ItemId, LineItem, Money, OrderId, TenantId};
use crate::error::{OrderError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Item,
    Submit,
    Status,
}

/// One raw row of the commands file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub r#type: CommandType,
    pub tenant: String,
    pub order: String,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| OrderError::ValidationError(format!("Missing '{field}' column")))
}

impl TryFrom<CommandRecord> for OrderCommand {
    type Error = OrderError;

    fn try_from(record: CommandRecord) -> Result<Self> {
        if record.tenant.is_empty() || record.order.is_empty() {
            return Err(OrderError::ValidationError(
                "Tenant and order are required".to_string(),
            ));
        }
        let tenant = TenantId::from(record.tenant);
        let order = OrderId::from(record.order);

        match record.r#type {
            CommandType::Item => {
                let item = required(record.item.filter(|i| !i.is_empty()), "item")?;
                let quantity = required(record.quantity, "quantity")?;
                let unit_price = Money::new(required(record.unit_price, "unit_price")?)?;
                Ok(OrderCommand::AddItem {
                    tenant,
                    order,
                    line: LineItem::new(ItemId::from(item), quantity, unit_price)?,
                })
            }
            CommandType::Submit => Ok(OrderCommand::Submit { tenant, order }),
            CommandType::Status => Ok(OrderCommand::ChangeStatus {
                tenant,
                order,
                status: required(record.status, "status")?.parse()?,
                expected_version: record.version,
            }),
        }
    }
}

/// Reads order commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<OrderCommand>`.
/// It handles whitespace trimming and short rows (trailing columns omitted) automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates commands.
    pub fn commands(self) -> impl Iterator<Item = Result<OrderCommand>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map_err(OrderError::from)
                .and_then(|record: CommandRecord| record.try_into())
        })
    }
}
