use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
pub use tos_common::{Money, TaxRate};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

//--------------------------------------        Ids          ---------------------------------------------------------
id_type!(
    /// The authenticated principal (a diner or a restaurant admin).
    UserId
);
id_type!(RestaurantId);
id_type!(TableId);
id_type!(MenuItemId);
id_type!(
    /// Opaque, globally unique order identity.
    OrderId
);
id_type!(
    /// Opaque, globally unique identity of one settlement attempt. The gateway knows it as its "order id".
    TransactionId
);

impl OrderId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl TransactionId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

//--------------------------------------   PaymentStatus     ---------------------------------------------------------
/// Payment status shared by orders and transactions.
///
/// Allowed transitions for a transaction:
///
/// | From      | To                                          |
/// |-----------|---------------------------------------------|
/// | NotPaid   | Pending, Successful, Failed, Invalid        |
/// | Pending   | Pending (re-query), Successful, Failed, Invalid |
/// | Successful, Failed, Invalid | none (terminal)           |
///
/// An order carries a copy of the status of its most recently reconciled transaction, so it may move between the
/// non-successful states freely. Nothing ever leaves `Successful`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Checkout has been initiated, but the gateway has not reported any progress.
    NotPaid,
    /// The gateway has accepted the payment but not settled it yet.
    Pending,
    Successful,
    /// The gateway rejected the payment details.
    Invalid,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Successful | Self::Invalid | Self::Failed)
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        match (self, next) {
            (NotPaid, _) => true,
            (Pending, NotPaid) => false,
            (Pending, _) => true,
            _ => false,
        }
    }

    /// Whether an order currently in this state may take on `next` as its denormalized status.
    pub fn order_can_adopt(&self, next: PaymentStatus) -> bool {
        *self != Self::Successful || next == Self::Successful
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::NotPaid => write!(f, "NOT_PAID"),
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Successful => write!(f, "SUCCESSFUL"),
            PaymentStatus::Invalid => write!(f, "INVALID"),
            PaymentStatus::Failed => write!(f, "FAILED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid payment status: {0}")]
pub struct PaymentStatusParseError(String);

impl FromStr for PaymentStatus {
    type Err = PaymentStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace(['_', ' '], "").as_str() {
            "NOTPAID" => Ok(Self::NotPaid),
            "PENDING" => Ok(Self::Pending),
            "SUCCESSFUL" => Ok(Self::Successful),
            "INVALID" => Ok(Self::Invalid),
            "FAILED" => Ok(Self::Failed),
            _ => Err(PaymentStatusParseError(s.to_string())),
        }
    }
}

//--------------------------------------      Catalog        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub owner_id: UserId,
    pub name: String,
    pub tax_percent: TaxRate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub price: Money,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub id: RestaurantId,
    pub owner_id: UserId,
    pub name: String,
    pub tax_percent: TaxRate,
}

#[derive(Debug, Clone)]
pub struct NewTable {
    pub id: TableId,
    pub restaurant_id: RestaurantId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub id: MenuItemId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub price: Money,
    pub active: bool,
}

//--------------------------------------       Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub table_id: TableId,
    pub payment_status: PaymentStatus,
    pub price_excluding_tax: Money,
    pub tax: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn total(&self) -> Money {
        self.price_excluding_tax + self.tax
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub table_id: TableId,
}

impl NewOrder {
    pub fn new(user_id: UserId, restaurant_id: RestaurantId, table_id: TableId) -> Self {
        Self { id: OrderId::random(), user_id, restaurant_id, table_id }
    }
}

//--------------------------------------     OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
    pub quantity: i64,
    pub price: Money,
}

/// One requested line of a cart merge: "add `quantity` more of this item".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: MenuItemId,
    pub quantity: i64,
}

impl CartLine {
    pub fn new<M: Into<MenuItemId>>(menu_item_id: M, quantity: i64) -> Self {
        Self { menu_item_id: menu_item_id.into(), quantity }
    }
}

//--------------------------------------    Transaction      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub order_id: OrderId,
    pub user_id: UserId,
    /// The order total, tax included, frozen when checkout was invoked.
    pub price: Money,
    pub payment_status: PaymentStatus,
    pub gateway_token: Option<String>,
    pub callback_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub id: TransactionId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub price: Money,
}
