use crate::application::lifecycle::OrderLifecycleManager;
use crate::domain::command::OrderCommand;
use crate::domain::order::{Cart, Order, OrderId, TenantId};
use crate::error::{OrderError, Result};
use std::collections::HashMap;

/// Applies a stream of [`OrderCommand`]s to a lifecycle manager.
///
/// Line items are buffered per (tenant, order) until the matching `Submit`
/// arrives, mirroring a storefront cart that is only sent on checkout.
pub struct CommandProcessor {
    manager: OrderLifecycleManager,
    carts: HashMap<(TenantId, OrderId), Cart>,
}

impl CommandProcessor {
    pub fn new(manager: OrderLifecycleManager) -> Self {
        Self {
            manager,
            carts: HashMap::new(),
        }
    }

    pub fn manager(&self) -> &OrderLifecycleManager {
        &self.manager
    }

    /// Applies one command. Returns the order it placed or changed, if any.
    pub async fn apply(&mut self, command: OrderCommand) -> Result<Option<Order>> {
        match command {
            OrderCommand::AddItem {
                tenant,
                order,
                line,
            } => {
                self.carts
                    .entry((tenant, order.clone()))
                    .or_insert_with(|| Cart::new().with_id(order))
                    .items
                    .push(line);
                Ok(None)
            }
            OrderCommand::Submit { tenant, order } => {
                let cart = self
                    .carts
                    .remove(&(tenant.clone(), order.clone()))
                    .ok_or_else(|| {
                        OrderError::ValidationError(format!(
                            "No pending items for order {order} of tenant {tenant}"
                        ))
                    })?;
                self.manager.place_order(&tenant, cart).await.map(Some)
            }
            OrderCommand::ChangeStatus {
                tenant,
                order,
                status,
                expected_version,
            } => self
                .manager
                .change_status(&tenant, &order, status, expected_version)
                .await
                .map(Some),
        }
    }

    /// Number of carts that never got submitted.
    pub fn pending_carts(&self) -> usize {
        self.carts.len()
    }

    /// Consumes the processor and returns every stored order.
    pub async fn into_results(self) -> Result<Vec<Order>> {
        self.manager.into_results().await
    }
}
