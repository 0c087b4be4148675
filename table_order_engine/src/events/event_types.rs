use serde::{Deserialize, Serialize};

use crate::db_types::{Order, PaymentStatus, Transaction};

/// Emitted once a transaction settles as `Successful` and the order has adopted that status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
    pub transaction: Transaction,
}

impl OrderPaidEvent {
    pub fn new(order: Order, transaction: Transaction) -> Self {
        Self { order, transaction }
    }
}

/// Emitted when a transaction settles as `Failed` or `Invalid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFailedEvent {
    pub order: Order,
    pub transaction: Transaction,
}

impl PaymentFailedEvent {
    pub fn new(order: Order, transaction: Transaction) -> Self {
        Self { order, transaction }
    }

    pub fn status(&self) -> PaymentStatus {
        self.transaction.payment_status
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderPaid(OrderPaidEvent),
    PaymentFailed(PaymentFailedEvent),
}
