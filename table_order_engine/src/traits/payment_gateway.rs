use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tos_common::Money;

use crate::db_types::{PaymentStatus, TransactionId, UserId};

/// What the gateway hands back when a transaction is opened. The client needs both to launch the payment UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayHandle {
    pub token: String,
    pub callback_url: String,
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway did not respond within {0:?}")]
    Timeout(Duration),
    #[error("Could not reach the payment gateway. {0}")]
    Unreachable(String),
    #[error("The payment gateway rejected the request. {0}")]
    Rejected(String),
    #[error("The payment gateway sent a response that could not be understood. {0}")]
    InvalidResponse(String),
}

/// The external payment provider.
///
/// Both calls may be slow, may fail, and may return a status that contradicts an earlier answer. The gateway is the
/// source of truth for payment status until the local record is terminal.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// The merchant id that clients pass to the gateway's payment UI.
    fn merchant_id(&self) -> &str;

    /// Opens a gateway transaction for `amount`. If this fails the caller must assume nothing was opened.
    async fn open_transaction(
        &self,
        user: &UserId,
        transaction_id: &TransactionId,
        amount: Money,
    ) -> Result<GatewayHandle, GatewayError>;

    async fn query_status(&self, transaction_id: &TransactionId) -> Result<PaymentStatus, GatewayError>;
}
