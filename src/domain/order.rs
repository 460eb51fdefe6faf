use crate::domain::status::OrderStatus;
use crate::error::{OrderError, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// A vendor account. Every order belongs to exactly one tenant.
    TenantId
);
string_id!(OrderId);
string_id!(
    /// Reference to a catalogue item.
    ItemId
);

impl OrderId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// A non-negative monetary value.
///
/// Wraps `rust_decimal::Decimal` so prices and totals cannot go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(OrderError::ValidationError(
                "Amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Money {
    type Error = OrderError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// One line of an order: an item, how many, and the price per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub item: ItemId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl LineItem {
    pub fn new(item: impl Into<ItemId>, quantity: u32, unit_price: Money) -> Result<Self> {
        if quantity == 0 {
            return Err(OrderError::ValidationError(
                "Quantity must be positive".to_string(),
            ));
        }
        Ok(Self {
            item: item.into(),
            quantity,
            unit_price,
        })
    }

    pub fn subtotal(&self) -> Money {
        Money(self.unit_price.0 * Decimal::from(self.quantity))
    }
}

/// A submitted cart, waiting to become an order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    pub order: Option<OrderId>,
    pub items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the identifier of the order this cart will create.
    pub fn with_id(mut self, order: impl Into<OrderId>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn line(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A customer purchase owned by a single tenant.
///
/// Status only moves along [`OrderStatus::allowed_targets`], and every
/// successful move bumps `version` by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    tenant: TenantId,
    items: Vec<LineItem>,
    total: Money,
    status: OrderStatus,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    pub const INITIAL_VERSION: u64 = 1;

    /// Creates an order in `NEW`, totalled from its line items.
    pub fn new(
        id: OrderId,
        tenant: TenantId,
        items: Vec<LineItem>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if items.is_empty() {
            return Err(OrderError::ValidationError(
                "Order must contain at least one line item".to_string(),
            ));
        }
        let total = items.iter().map(LineItem::subtotal).sum();
        Ok(Self {
            id,
            tenant,
            items,
            total,
            status: OrderStatus::New,
            version: Self::INITIAL_VERSION,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_owned_by(&self, tenant: &TenantId) -> bool {
        &self.tenant == tenant
    }

    /// Moves the order to `to`, bumping the version.
    ///
    /// The order is left untouched when the move is not in the transition
    /// table. `updated_at` always ends strictly later than before, even if
    /// `now` did not advance.
    pub fn transition(&mut self, to: OrderStatus, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.version += 1;
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
        Ok(())
    }
}
