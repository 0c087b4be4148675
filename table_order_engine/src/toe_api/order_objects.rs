use serde::{Deserialize, Serialize};

use crate::db_types::{MenuItem, Money, Order, OrderId, OrderItem, Restaurant, Table, TaxRate, Transaction};

/// The largest quantity (exclusive) that a single cart line may carry in one merge call.
pub const MAX_LINE_QUANTITY: i64 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrderResult {
    pub order_id: OrderId,
    pub tax_percent: TaxRate,
}

/// Everything a diner sees after scanning a table's QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuView {
    pub restaurant: Restaurant,
    pub table: Table,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub transactions: Vec<Transaction>,
}

impl OrderSnapshot {
    pub fn total(&self) -> Money {
        self.order.total()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    pub success: bool,
    pub subtotal: Money,
}
