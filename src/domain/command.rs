use super::order::{LineItem, OrderId, TenantId};
use super::status::OrderStatus;

/// A validated command, ready to be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderCommand {
    /// Appends a line to the pending cart of an order.
    AddItem {
        tenant: TenantId,
        order: OrderId,
        line: LineItem,
    },
    /// Places the pending cart as an order.
    Submit { tenant: TenantId, order: OrderId },
    ChangeStatus {
        tenant: TenantId,
        order: OrderId,
        status: OrderStatus,
        expected_version: Option<u64>,
    },
}
