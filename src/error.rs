use crate::domain::order::{OrderId, TenantId};
use crate::domain::status::OrderStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrderError>;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Order {order} not found for tenant {tenant}")]
    NotFound { tenant: TenantId, order: OrderId },
    #[error("Invalid transition: {from}→{to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Version conflict on order {order}: expected {expected}, found {actual}")]
    VersionConflict {
        order: OrderId,
        expected: u64,
        actual: u64,
    },
    #[error("Order {0} already exists")]
    DuplicateOrder(OrderId),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl OrderError {
    /// Whether the caller can act on the error (retry, pick another action,
    /// surface it) as opposed to a broken storage backend.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, OrderError::IoError(_) | OrderError::InternalError(_))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for OrderError {
    fn from(e: rocksdb::Error) -> Self {
        OrderError::InternalError(Box::new(e))
    }
}
