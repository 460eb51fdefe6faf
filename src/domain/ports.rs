use super::order::{Order, OrderId, TenantId};
use crate::error::Result;
use async_trait::async_trait;

/// Storage port for orders.
///
/// Lookups are tenant-scoped: an order owned by another tenant is reported
/// as absent. Writes after creation go through [`OrderStore::compare_and_set`]
/// so concurrent writers cannot silently overwrite each other.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Stores a new order. Fails with `DuplicateOrder` if the id is taken.
    async fn insert(&self, order: Order) -> Result<()>;
    async fn get(&self, tenant: &TenantId, order: &OrderId) -> Result<Option<Order>>;
    async fn list(&self, tenant: &TenantId) -> Result<Vec<Order>>;
    /// Replaces the stored order only if its version still equals
    /// `expected_version`, failing with `VersionConflict` otherwise.
    async fn compare_and_set(&self, order: Order, expected_version: u64) -> Result<()>;
    /// Every stored order across all tenants.
    async fn all(&self) -> Result<Vec<Order>>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type OrderStoreFactory = Box<dyn Fn() -> OrderStoreBox + Send + Sync>;

/// Canonical snapshot ordering: creation time, then id.
pub fn sort_snapshot(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
}
