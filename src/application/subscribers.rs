use crate::domain::order::{Order, TenantId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc;
use tracing::debug;

type SubscriberMap = HashMap<u64, Subscriber>;

struct Subscriber {
    tenant: TenantId,
    sender: mpsc::UnboundedSender<Vec<Order>>,
}

/// Tenant-filtered fan-out of order snapshots.
///
/// Delivery is best-effort: a subscriber whose receiver is gone is pruned on
/// the next publish.
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    subscribers: Arc<Mutex<SubscriberMap>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, tenant: TenantId) -> OrderSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        lock(&self.subscribers).insert(
            id,
            Subscriber {
                tenant: tenant.clone(),
                sender,
            },
        );
        OrderSubscription {
            id,
            tenant,
            receiver,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    /// Sends `snapshot` to every subscriber of `tenant`.
    pub fn publish(&self, tenant: &TenantId, snapshot: &[Order]) {
        let mut subscribers = lock(&self.subscribers);
        subscribers.retain(|id, subscriber| {
            if &subscriber.tenant != tenant {
                return true;
            }
            let delivered = subscriber.sender.send(snapshot.to_vec()).is_ok();
            if !delivered {
                debug!(subscription = id, "pruning closed subscription");
            }
            delivered
        });
    }

    pub fn subscriber_count(&self, tenant: &TenantId) -> usize {
        lock(&self.subscribers)
            .values()
            .filter(|s| &s.tenant == tenant)
            .count()
    }
}

// The map is never left half-updated, so a poisoned lock is still usable.
fn lock(map: &Mutex<SubscriberMap>) -> MutexGuard<'_, SubscriberMap> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A live subscription to one tenant's orders.
///
/// Each mutation of the tenant's orders yields the full current snapshot.
/// Dropping the handle unsubscribes.
pub struct OrderSubscription {
    id: u64,
    tenant: TenantId,
    receiver: mpsc::UnboundedReceiver<Vec<Order>>,
    registry: Weak<Mutex<SubscriberMap>>,
}

impl OrderSubscription {
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// Waits for the next snapshot. Returns `None` once the manager is gone.
    pub async fn recv(&mut self) -> Option<Vec<Order>> {
        self.receiver.recv().await
    }

    /// Returns a pending snapshot without waiting.
    pub fn try_recv(&mut self) -> Option<Vec<Order>> {
        self.receiver.try_recv().ok()
    }

    pub fn unsubscribe(self) {}
}

impl Drop for OrderSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(&self.id);
        }
    }
}
