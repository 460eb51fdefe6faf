use crate::application::subscribers::{OrderSubscription, SubscriberRegistry};
use crate::config::LifecycleConfig;
use crate::domain::order::{Cart, Order, OrderId, TenantId};
use crate::domain::ports::OrderStoreBox;
use crate::domain::status::OrderStatus;
use crate::error::{OrderError, Result};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Owns the order set of one process and enforces the status transition
/// table on it.
///
/// Every successful mutation is written back with a compare-and-set against
/// the version that was read, then the full snapshot of the affected tenant
/// is pushed to that tenant's subscribers. Rejected calls change nothing and
/// notify nobody.
///
/// Commits and their snapshot reads are serialised by `commit_lock`, so the
/// last snapshot a subscriber receives always matches the store.
pub struct OrderLifecycleManager {
    store: OrderStoreBox,
    subscribers: SubscriberRegistry,
    config: LifecycleConfig,
    commit_lock: Mutex<()>,
}

impl OrderLifecycleManager {
    /// Creates a new `OrderLifecycleManager` over `store`.
    pub fn new(store: OrderStoreBox) -> Self {
        Self::with_config(store, LifecycleConfig::default())
    }

    pub fn with_config(store: OrderStoreBox, config: LifecycleConfig) -> Self {
        Self {
            store,
            subscribers: SubscriberRegistry::new(),
            config,
            commit_lock: Mutex::new(()),
        }
    }

    /// Turns a submitted cart into an order in `NEW`.
    pub async fn place_order(&self, tenant: &TenantId, cart: Cart) -> Result<Order> {
        self.simulate_latency().await;

        let id = cart.order.unwrap_or_else(OrderId::generate);
        let order = Order::new(id, tenant.clone(), cart.items, Utc::now())?;
        let _commit = self.commit_lock.lock().await;
        self.store.insert(order.clone()).await?;

        info!(
            tenant = %tenant,
            order = %order.id(),
            total = %order.total(),
            "order placed"
        );
        self.notify(tenant).await;
        Ok(order)
    }

    /// Moves an order to `new_status`.
    ///
    /// With `expected_version` set, the call fails with `VersionConflict`
    /// unless the stored order is still at that version. Without it, the
    /// version read here is used for the final compare-and-set, so a
    /// concurrent writer still causes a conflict rather than a lost update.
    pub async fn change_status(
        &self,
        tenant: &TenantId,
        order_id: &OrderId,
        new_status: OrderStatus,
        expected_version: Option<u64>,
    ) -> Result<Order> {
        self.simulate_latency().await;

        let mut order = self.get(tenant, order_id).await?;
        let read_version = order.version();

        if let Some(expected) = expected_version
            && expected != read_version
        {
            debug!(order = %order_id, expected, actual = read_version, "stale version");
            return Err(OrderError::VersionConflict {
                order: order_id.clone(),
                expected,
                actual: read_version,
            });
        }

        let from = order.status();
        order.transition(new_status, Utc::now())?;
        let _commit = self.commit_lock.lock().await;
        self.store.compare_and_set(order.clone(), read_version).await?;

        info!(
            tenant = %tenant,
            order = %order_id,
            from = %from,
            to = %new_status,
            version = order.version(),
            "order status changed"
        );
        self.notify(tenant).await;
        Ok(order)
    }

    pub async fn get(&self, tenant: &TenantId, order_id: &OrderId) -> Result<Order> {
        self.store
            .get(tenant, order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound {
                tenant: tenant.clone(),
                order: order_id.clone(),
            })
    }

    /// Current snapshot of a tenant's orders.
    pub async fn list(&self, tenant: &TenantId) -> Result<Vec<Order>> {
        self.store.list(tenant).await
    }

    /// Subscribes to snapshots of `tenant`'s orders.
    pub fn subscribe(&self, tenant: &TenantId) -> OrderSubscription {
        self.subscribers.subscribe(tenant.clone())
    }

    /// Consumes the manager and returns every stored order.
    pub async fn into_results(self) -> Result<Vec<Order>> {
        self.store.all().await
    }

    /// Publishes the tenant's snapshot. The mutation is already committed, so
    /// a failed read is logged and does not fail the caller.
    async fn notify(&self, tenant: &TenantId) {
        if self.subscribers.subscriber_count(tenant) == 0 {
            return;
        }
        match self.store.list(tenant).await {
            Ok(snapshot) => {
                debug!(tenant = %tenant, orders = snapshot.len(), "publishing snapshot");
                self.subscribers.publish(tenant, &snapshot);
            }
            Err(e) => warn!(tenant = %tenant, error = %e, "snapshot not published"),
        }
    }

    async fn simulate_latency(&self) {
        if !self.config.simulated_latency.is_zero() {
            tokio::time::sleep(self.config.simulated_latency).await;
        }
    }
}
