use chrono::{DateTime, Utc};

use crate::{
    db_types::{Order, OrderId, PaymentStatus, Transaction, TransactionId, UserId},
    traits::{GatewayHandle, OrderFlowError},
};

/// The result of a payment status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Nothing was written. Either the transaction was already terminal, or the status did not change.
    Unchanged(Transaction),
    /// The transaction and its order were both updated.
    Updated { order: Order, transaction: Transaction },
}

impl StatusUpdate {
    pub fn status(&self) -> PaymentStatus {
        match self {
            StatusUpdate::Unchanged(tx) => tx.payment_status,
            StatusUpdate::Updated { transaction, .. } => transaction.payment_status,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait CheckoutManagement {
    async fn fetch_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>, OrderFlowError>;

    async fn fetch_transactions_for_order(&self, order_id: &OrderId) -> Result<Vec<Transaction>, OrderFlowError>;

    /// Reserves a checkout attempt in one atomic store transaction:
    /// * checks ownership, that the order is not yet paid, and that the subtotal is non-zero,
    /// * computes the tax from the restaurant's rate and stores it on the order,
    /// * inserts a `NotPaid` transaction for the order total, without a gateway handle.
    ///
    /// Once this commits the order is frozen: later merges fail.
    async fn begin_checkout(
        &self,
        order_id: &OrderId,
        requester: &UserId,
        transaction_id: &TransactionId,
    ) -> Result<(Order, Transaction), OrderFlowError>;

    /// Records the gateway's handle on a reserved transaction.
    async fn attach_gateway_handle(
        &self,
        transaction_id: &TransactionId,
        handle: &GatewayHandle,
    ) -> Result<Transaction, OrderFlowError>;

    /// Compensates a reservation whose gateway call failed. The transaction row is deleted, and if the order has no
    /// other transactions its tax is reset so that it is no longer frozen.
    async fn abandon_checkout(&self, transaction_id: &TransactionId) -> Result<(), OrderFlowError>;

    /// Writes `status` to the transaction and its order atomically, with the order row locked.
    ///
    /// Terminal transactions and same-status writes return [`StatusUpdate::Unchanged`]. If a different transaction on
    /// the order is already `Successful` this fails with `PaidByOtherTransaction`, and illegal moves fail with
    /// `IllegalTransition`.
    async fn update_payment_status(
        &self,
        transaction_id: &TransactionId,
        status: PaymentStatus,
    ) -> Result<StatusUpdate, OrderFlowError>;

    /// Transactions holding a gateway handle that are still `NotPaid` or `Pending` and were last touched at or before
    /// `older_than`, oldest first.
    async fn fetch_unsettled_transactions(&self, older_than: DateTime<Utc>)
        -> Result<Vec<Transaction>, OrderFlowError>;
}
