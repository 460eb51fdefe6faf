use crate::domain::order::{Order, OrderId, TenantId};
use crate::domain::ports::{OrderStore, sort_snapshot};
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Column Family for storing orders.
pub const CF_ORDERS: &str = "orders";
/// Column Family mapping order ids to their owning tenant.
pub const CF_ORDER_INDEX: &str = "order_index";

/// A persistent order store backed by RocksDB.
///
/// Keys are `len(tenant) tenant order`, with the length as a big-endian `u32`,
/// so a tenant's orders are one prefix scan away and no tenant id can be a
/// prefix of another's keys. Order ids are unique across tenants;
/// `order_index` enforces that.
/// Writes are serialised through `write_lock`, which makes the read-compare-write
/// of `compare_and_set` atomic within the process.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

fn internal(message: String) -> OrderError {
    OrderError::InternalError(Box::new(std::io::Error::other(message)))
}

fn order_key(tenant: &TenantId, order: &OrderId) -> Vec<u8> {
    let mut key = tenant_prefix(tenant);
    key.extend_from_slice(order.as_str().as_bytes());
    key
}

fn tenant_prefix(tenant: &TenantId) -> Vec<u8> {
    let bytes = tenant.as_str().as_bytes();
    let mut prefix = Vec::with_capacity(4 + bytes.len());
    prefix.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    prefix.extend_from_slice(bytes);
    prefix
}

fn decode(bytes: &[u8]) -> Result<Order> {
    serde_json::from_slice(bytes).map_err(|e| internal(format!("Deserialization error: {e}")))
}

fn encode(order: &Order) -> Result<Vec<u8>> {
    serde_json::to_vec(order).map_err(|e| internal(format!("Serialization error: {e}")))
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "orders" and "order_index" column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_index = ColumnFamilyDescriptor::new(CF_ORDER_INDEX, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_index])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_ORDERS)
            .ok_or_else(|| internal("Orders column family not found".to_string()))
    }

    fn index_cf(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_ORDER_INDEX)
            .ok_or_else(|| internal("Order index column family not found".to_string()))
    }

    fn scan(&self, mode: IteratorMode<'_>, prefix: &[u8]) -> Result<Vec<Order>> {
        let cf = self.cf()?;
        let mut orders = Vec::new();
        for item in self.db.iterator_cf(cf, mode) {
            let (key, value) =
                item.map_err(|e| internal(format!("RocksDB iteration error: {e}")))?;
            if !key.starts_with(prefix) {
                break;
            }
            orders.push(decode(&value)?);
        }
        sort_snapshot(&mut orders);
        Ok(orders)
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let index = self.index_cf()?;
        let id = order.id().as_str().as_bytes();
        if let Some(owner) = self.db.get_cf(index, id)? {
            let owner = TenantId::from(String::from_utf8_lossy(&owner).into_owned());
            if self
                .db
                .get_pinned_cf(self.cf()?, order_key(&owner, order.id()))?
                .is_some()
            {
                return Err(OrderError::DuplicateOrder(order.id().clone()));
            }
            // Reserved by an insert that never wrote its order row.
            warn!(order = %order.id(), tenant = %owner, "reclaiming orphaned order id");
        }

        // Index first; a torn write leaves an orphaned reservation, reclaimed above.
        let value = encode(&order)?;
        self.db
            .put_cf(index, id, order.tenant().as_str().as_bytes())?;
        self.db
            .put_cf(self.cf()?, order_key(order.tenant(), order.id()), value)?;
        Ok(())
    }

    async fn get(&self, tenant: &TenantId, order: &OrderId) -> Result<Option<Order>> {
        let cf = self.cf()?;
        self.db
            .get_cf(cf, order_key(tenant, order))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    async fn list(&self, tenant: &TenantId) -> Result<Vec<Order>> {
        let prefix = tenant_prefix(tenant);
        self.scan(IteratorMode::From(&prefix, Direction::Forward), &prefix)
    }

    async fn compare_and_set(&self, order: Order, expected_version: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let cf = self.cf()?;
        let key = order_key(order.tenant(), order.id());
        let stored = match self.db.get_cf(cf, &key)? {
            Some(bytes) => decode(&bytes)?,
            None => {
                return Err(OrderError::NotFound {
                    tenant: order.tenant().clone(),
                    order: order.id().clone(),
                });
            }
        };

        if stored.version() != expected_version {
            return Err(OrderError::VersionConflict {
                order: order.id().clone(),
                expected: expected_version,
                actual: stored.version(),
            });
        }
        self.db.put_cf(cf, key, encode(&order)?)?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Order>> {
        self.scan(IteratorMode::Start, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{LineItem, Money};
    use crate::domain::status::OrderStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn order(id: &str, tenant: &str) -> Order {
        let items = vec![LineItem::new("cake", 2, Money::new(dec!(5.0)).unwrap()).unwrap()];
        Order::new(OrderId::from(id), TenantId::from(tenant), items, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_ORDERS).is_some());
        assert!(store.db.cf_handle(CF_ORDER_INDEX).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_tenant_prefix_scan() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        store.insert(order("o1", "t1")).await.unwrap();
        store.insert(order("o2", "t1")).await.unwrap();
        // "t1\0x" must stay outside "t1"'s key range.
        store.insert(order("o3", "t1\0x")).await.unwrap();
        assert!(matches!(
            store.insert(order("o3", "t2")).await,
            Err(OrderError::DuplicateOrder(_))
        ));

        let t1 = store.list(&TenantId::from("t1")).await.unwrap();
        assert_eq!(t1.len(), 2);
        assert!(t1.iter().all(|o| o.tenant() == &TenantId::from("t1")));
        assert_eq!(store.all().await.unwrap().len(), 3);

        let foreign = store
            .get(&TenantId::from("t1\0x"), &OrderId::from("o1"))
            .await
            .unwrap();
        assert!(foreign.is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_orphaned_reservation_is_reclaimed() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let index = store.index_cf().unwrap();
        store.db.put_cf(index, b"o1", b"t2").unwrap();

        store.insert(order("o1", "t1")).await.unwrap();

        let stored = store
            .get(&TenantId::from("t1"), &OrderId::from("o1"))
            .await
            .unwrap();
        assert!(stored.is_some());
        assert!(matches!(
            store.insert(order("o1", "t2")).await,
            Err(OrderError::DuplicateOrder(_))
        ));
    }

    #[tokio::test]
    async fn test_rocksdb_compare_and_set_round_trip() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let mut o = order("o1", "t1");
        store.insert(o.clone()).await.unwrap();
        assert!(matches!(
            store.insert(o.clone()).await,
            Err(OrderError::DuplicateOrder(_))
        ));

        o.transition(OrderStatus::InProgress, Utc::now()).unwrap();
        store.compare_and_set(o.clone(), 1).await.unwrap();
        assert!(matches!(
            store.compare_and_set(o.clone(), 1).await,
            Err(OrderError::VersionConflict { .. })
        ));

        let stored = store
            .get(&TenantId::from("t1"), &OrderId::from("o1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, o);
    }
}
