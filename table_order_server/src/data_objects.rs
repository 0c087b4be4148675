use std::fmt::Display;

use serde::{Deserialize, Serialize};
use table_order_engine::db_types::{
    CartLine,
    MenuItemId,
    OrderId,
    PaymentStatus,
    RestaurantId,
    TableId,
    TransactionId,
    UserId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableLocation {
    pub restaurant_id: RestaurantId,
    pub table_id: TableId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListEntry {
    pub menu_id: MenuItemId,
    pub quantity: i64,
}

impl From<OrderListEntry> for CartLine {
    fn from(entry: OrderListEntry) -> Self {
        CartLine { menu_item_id: entry.menu_id, quantity: entry.quantity }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeItemsRequest {
    pub order_id: OrderId,
    #[serde(default)]
    pub order_list: Vec<OrderListEntry>,
}

impl MergeItemsRequest {
    pub fn cart_lines(self) -> Vec<CartLine> {
        self.order_list.into_iter().map(CartLine::from).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: OrderId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusRequest {
    pub transaction_id: TransactionId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub payment_status: PaymentStatus,
}

/// The payment result that the gateway's callback relay posts back to us.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCallback {
    pub transaction_id: TransactionId,
    /// The customer the transaction was opened for. It must be the transaction's owner.
    pub cust_id: UserId,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub sqlite_version: String,
}
