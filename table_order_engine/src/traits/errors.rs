use serde::Serialize;
use thiserror::Error;

use crate::{
    db_types::{OrderId, PaymentStatus, RestaurantId, TableId, TransactionId, UserId},
    traits::GatewayError,
};

/// Stable, caller-facing classification of [`OrderFlowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Unauthorized,
    Conflict,
    GatewayUnavailable,
    Internal,
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid request. {0}")]
    InvalidArgument(String),
    #[error("Restaurant {0} does not exist")]
    RestaurantNotFound(RestaurantId),
    #[error("Table {table} does not exist at restaurant {restaurant}")]
    TableNotFound { restaurant: RestaurantId, table: TableId },
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Transaction {0} does not exist")]
    TransactionNotFound(TransactionId),
    #[error("User {user} may not access {resource}")]
    Unauthorized { user: UserId, resource: String },
    #[error("Order {0} has already been paid")]
    AlreadyPaid(OrderId),
    #[error("Order {0} has been checked out. Its cart can no longer be changed")]
    OrderFrozen(OrderId),
    #[error("Order {0} was already paid by a different transaction")]
    PaidByOtherTransaction(OrderId),
    #[error("Illegal payment status change from {from} to {to}")]
    IllegalTransition { from: PaymentStatus, to: PaymentStatus },
    #[error("The payment gateway is unavailable. {0}")]
    GatewayUnavailable(String),
    #[error("We have an internal database engine (configuration/uptime etc.) error: {0}")]
    DatabaseError(String),
}

impl OrderFlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::RestaurantNotFound(_) |
            Self::TableNotFound { .. } |
            Self::OrderNotFound(_) |
            Self::TransactionNotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::AlreadyPaid(_) |
            Self::OrderFrozen(_) |
            Self::PaidByOtherTransaction(_) |
            Self::IllegalTransition { .. } => ErrorKind::Conflict,
            Self::GatewayUnavailable(_) => ErrorKind::GatewayUnavailable,
            Self::DatabaseError(_) => ErrorKind::Internal,
        }
    }

    pub fn unauthorized<S: Into<String>>(user: &UserId, resource: S) -> Self {
        Self::Unauthorized { user: user.clone(), resource: resource.into() }
    }
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

impl From<GatewayError> for OrderFlowError {
    fn from(e: GatewayError) -> Self {
        OrderFlowError::GatewayUnavailable(e.to_string())
    }
}
