#![allow(dead_code)]

use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal_macros::dec;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use vendor_orders::application::lifecycle::OrderLifecycleManager;
use vendor_orders::domain::order::{Cart, LineItem, Money, Order, OrderId, TenantId};
use vendor_orders::domain::status::OrderStatus;
use vendor_orders::infrastructure::in_memory::InMemoryOrderStore;

pub const HEADER: &str = "type, tenant, order, item, quantity, unit_price, status, version";

pub fn manager() -> OrderLifecycleManager {
    OrderLifecycleManager::new(Box::new(InMemoryOrderStore::new()))
}

pub fn cart(order: &str) -> Cart {
    Cart::new()
        .with_id(order)
        .line(LineItem::new("noodles", 2, Money::new(dec!(8.50)).unwrap()).unwrap())
        .line(LineItem::new("dumplings", 1, Money::new(dec!(5.00)).unwrap()).unwrap())
}

pub async fn place(manager: &OrderLifecycleManager, tenant: &str, order: &str) -> Order {
    manager
        .place_order(&TenantId::from(tenant), cart(order))
        .await
        .unwrap()
}

/// The shortest sequence of steps from `NEW` to `target`.
pub fn path_to(target: OrderStatus) -> Vec<OrderStatus> {
    match target {
        OrderStatus::New => vec![],
        OrderStatus::InProgress => vec![OrderStatus::InProgress],
        OrderStatus::Ready => vec![OrderStatus::InProgress, OrderStatus::Ready],
        OrderStatus::Completed => vec![
            OrderStatus::InProgress,
            OrderStatus::Ready,
            OrderStatus::Completed,
        ],
        OrderStatus::Cancelled => vec![OrderStatus::Cancelled],
    }
}

/// Places an order and walks it to `target`.
pub async fn order_in(
    manager: &OrderLifecycleManager,
    tenant: &str,
    order: &str,
    target: OrderStatus,
) -> Order {
    let mut current = place(manager, tenant, order).await;
    for step in path_to(target) {
        current = manager
            .change_status(&TenantId::from(tenant), &OrderId::from(order), step, None)
            .await
            .unwrap();
    }
    current
}

/// Writes `rows` below the standard header into a temporary file.
pub fn commands_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

/// Generates `orders` orders across `tenants` tenants, each followed by a
/// random walk of status commands (valid and invalid).
pub fn generate_commands(path: &Path, tenants: usize, orders: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    wtr.write_record([
        "type",
        "tenant",
        "order",
        "item",
        "quantity",
        "unit_price",
        "status",
        "version",
    ])?;

    let mut rng = rand::thread_rng();
    for i in 1..=orders {
        let tenant = format!("t{}", rng.gen_range(1..=tenants));
        let order = format!("o{i}");
        for line in 0..rng.gen_range(1..=3) {
            let quantity = rng.gen_range(1..=5).to_string();
            let item = format!("sku{line}");
            wtr.write_record([
                "item",
                tenant.as_str(),
                order.as_str(),
                item.as_str(),
                quantity.as_str(),
                "1.25",
            ])?;
        }
        wtr.write_record(["submit", tenant.as_str(), order.as_str()])?;
        for _ in 0..rng.gen_range(0..6) {
            let status = OrderStatus::ALL.choose(&mut rng).unwrap().as_str();
            wtr.write_record([
                "status",
                tenant.as_str(),
                order.as_str(),
                "",
                "",
                "",
                status,
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
