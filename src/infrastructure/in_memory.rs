use crate::domain::order::{Order, OrderId, TenantId};
use crate::domain::ports::{OrderStore, sort_snapshot};
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for orders.
///
/// Uses `Arc<RwLock<HashMap<OrderId, Order>>>` to allow shared concurrent access.
/// The version check and the write of `compare_and_set` happen under one
/// write guard, so the check-and-set is atomic.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        match orders.entry(order.id().clone()) {
            Entry::Occupied(entry) => Err(OrderError::DuplicateOrder(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(order);
                Ok(())
            }
        }
    }

    async fn get(&self, tenant: &TenantId, order: &OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order).filter(|o| o.is_owned_by(tenant)).cloned())
    }

    async fn list(&self, tenant: &TenantId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut owned: Vec<Order> = orders
            .values()
            .filter(|o| o.is_owned_by(tenant))
            .cloned()
            .collect();
        sort_snapshot(&mut owned);
        Ok(owned)
    }

    async fn compare_and_set(&self, order: Order, expected_version: u64) -> Result<()> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(order.id())
            .filter(|o| o.is_owned_by(order.tenant()))
            .ok_or_else(|| OrderError::NotFound {
                tenant: order.tenant().clone(),
                order: order.id().clone(),
            })?;

        if stored.version() != expected_version {
            return Err(OrderError::VersionConflict {
                order: order.id().clone(),
                expected: expected_version,
                actual: stored.version(),
            });
        }
        *stored = order;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        sort_snapshot(&mut all);
        Ok(all)
    }
}
