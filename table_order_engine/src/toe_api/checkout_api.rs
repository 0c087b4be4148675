use std::{fmt::Debug, time::Duration};

use chrono::{DateTime, Utc};
use log::*;
use tokio::time::timeout;

use crate::{
    db_types::{Order, OrderId, PaymentStatus, Transaction, TransactionId, UserId},
    events::{EventProducers, OrderPaidEvent, PaymentFailedEvent},
    toe_api::checkout_objects::{CheckoutResult, ReconcileSummary, StatusSource},
    traits::{CheckoutManagement, GatewayError, OrderFlowError, OrderManagement, PaymentGateway, StatusUpdate},
};

/// `CheckoutApi` turns a cart into a gateway transaction and keeps local payment state in step with the gateway.
///
/// The gateway is injected at construction. Every call to it is bounded by `gateway_timeout` and none is ever made
/// while a store transaction is open.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
    gateway_timeout: Duration,
    producers: EventProducers,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi (gateway timeout: {:?})", self.gateway_timeout)
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(db: B, gateway: G, gateway_timeout: Duration, producers: EventProducers) -> Self {
        Self { db, gateway, gateway_timeout, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: CheckoutManagement + OrderManagement,
    G: PaymentGateway,
{
    /// Checks out an order and opens a payment with the gateway.
    ///
    /// The order's tax is computed from the restaurant's rate and a `NotPaid` transaction for the full total is
    /// committed first, which freezes the order. Only then is the gateway asked to open the payment. If that fails or
    /// times out, the reservation is undone and `GatewayUnavailable` is returned, so no transaction is ever left
    /// holding a token the gateway did not issue. The same rollback happens if the gateway's handle cannot be recorded.
    pub async fn checkout(&self, order_id: &OrderId, requester: &UserId) -> Result<CheckoutResult, OrderFlowError> {
        let transaction_id = TransactionId::random();
        let (order, transaction) = self.db.begin_checkout(order_id, requester, &transaction_id).await?;
        debug!(
            "💳️ Checkout {transaction_id} reserved for order {order_id}: {} + {} tax = {}",
            order.price_excluding_tax, order.tax, transaction.price
        );
        let opened = timeout(
            self.gateway_timeout,
            self.gateway.open_transaction(requester, &transaction_id, transaction.price),
        )
        .await
        .unwrap_or(Err(GatewayError::Timeout(self.gateway_timeout)));
        let handle = match opened {
            Ok(handle) => handle,
            Err(e) => {
                warn!("💳️ The gateway could not open checkout {transaction_id} for order {order_id}. {e}");
                self.roll_back(&transaction_id).await;
                return Err(e.into());
            },
        };
        let transaction = match self.db.attach_gateway_handle(&transaction_id, &handle).await {
            Ok(transaction) => transaction,
            Err(e) => {
                // The gateway's payment is orphaned. Nothing local refers to it, so it can never be settled here.
                error!(
                    "💳️ Could not record the gateway handle for checkout {transaction_id} (token {}). {e}",
                    handle.token
                );
                self.roll_back(&transaction_id).await;
                return Err(e);
            },
        };
        info!("💳️ Checkout {transaction_id} for order {order_id} opened with the gateway for {}", transaction.price);
        Ok(CheckoutResult {
            transaction_id,
            merchant_id: self.gateway.merchant_id().to_string(),
            gateway_token: handle.token,
            callback_url: handle.callback_url,
            amount: transaction.price,
        })
    }

    /// Brings a transaction's payment status up to date and returns it.
    ///
    /// Once a transaction is terminal this returns its status without touching the store or the gateway, however
    /// often it is called. If a different transaction on the same order has already succeeded, this fails with a
    /// `Conflict` and leaves the transaction alone.
    ///
    /// With [`StatusSource::Query`] the gateway is asked for the status. A transaction that never received a gateway
    /// handle has nothing to ask about, so its current status is returned.
    pub async fn reconcile_payment_status(
        &self,
        transaction_id: &TransactionId,
        requester: &UserId,
        source: StatusSource,
    ) -> Result<PaymentStatus, OrderFlowError> {
        let transaction = self
            .db
            .fetch_transaction(transaction_id)
            .await?
            .ok_or_else(|| OrderFlowError::TransactionNotFound(transaction_id.clone()))?;
        let order = self
            .db
            .fetch_order(&transaction.order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(transaction.order_id.clone()))?;
        if &order.user_id != requester {
            return Err(OrderFlowError::unauthorized(requester, format!("transaction {transaction_id}")));
        }
        self.settle(transaction, source).await
    }

    /// Queries the gateway for every handed-off transaction that has been waiting since at least `older_than`.
    ///
    /// Failures on individual transactions are logged and counted, and do not stop the sweep.
    pub async fn reconcile_stale_payments(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<ReconcileSummary, OrderFlowError> {
        let stale = self.db.fetch_unsettled_transactions(older_than).await?;
        let mut summary = ReconcileSummary::default();
        for transaction in stale {
            let id = transaction.id.clone();
            match self.settle(transaction, StatusSource::Query).await {
                Ok(status) => summary.record(status),
                Err(e) => {
                    warn!("💳️ Could not reconcile transaction {id}. {e}");
                    summary.record_error();
                },
            }
        }
        Ok(summary)
    }

    async fn settle(&self, transaction: Transaction, source: StatusSource) -> Result<PaymentStatus, OrderFlowError> {
        let id = &transaction.id;
        let current = transaction.payment_status;
        if current.is_terminal() {
            trace!("💳️ Transaction {id} is already {current}");
            return Ok(current);
        }
        let paid_by_other = self
            .db
            .fetch_transactions_for_order(&transaction.order_id)
            .await?
            .iter()
            .any(|t| &t.id != id && t.payment_status == PaymentStatus::Successful);
        if paid_by_other {
            return Err(OrderFlowError::PaidByOtherTransaction(transaction.order_id.clone()));
        }
        let status = match source {
            StatusSource::Explicit(status) => status,
            StatusSource::Query if transaction.gateway_token.is_none() => {
                debug!("💳️ Transaction {id} has not been handed to the gateway yet. Status stays {current}");
                return Ok(current);
            },
            StatusSource::Query => self.query_gateway(id).await?,
        };
        match self.db.update_payment_status(id, status).await {
            Ok(StatusUpdate::Unchanged(t)) => Ok(t.payment_status),
            Ok(StatusUpdate::Updated { order, transaction }) => {
                info!("💳️ Transaction {id} for order {} moved from {current} to {status}", order.id);
                self.notify(order, transaction).await;
                Ok(status)
            },
            Err(OrderFlowError::IllegalTransition { from, to }) if source.is_query() => {
                warn!("💳️ The gateway reported {to} for transaction {id}, which cannot follow {from}. Ignoring it.");
                Ok(from)
            },
            Err(e) => Err(e),
        }
    }

    async fn roll_back(&self, transaction_id: &TransactionId) {
        if let Err(undo) = self.db.abandon_checkout(transaction_id).await {
            error!("💳️ Could not roll back checkout {transaction_id}. {undo}");
        }
    }

    async fn query_gateway(&self, id: &TransactionId) -> Result<PaymentStatus, OrderFlowError> {
        let status = timeout(self.gateway_timeout, self.gateway.query_status(id))
            .await
            .unwrap_or(Err(GatewayError::Timeout(self.gateway_timeout)))?;
        trace!("💳️ The gateway reports {status} for transaction {id}");
        Ok(status)
    }

    async fn notify(&self, order: Order, transaction: Transaction) {
        match transaction.payment_status {
            PaymentStatus::Successful => {
                debug!("💳️ Notifying order paid hook subscribers");
                self.producers.publish_order_paid(OrderPaidEvent::new(order, transaction)).await;
            },
            PaymentStatus::Failed | PaymentStatus::Invalid => {
                debug!("💳️ Notifying payment failed hook subscribers");
                self.producers.publish_payment_failed(PaymentFailedEvent::new(order, transaction)).await;
            },
            PaymentStatus::NotPaid | PaymentStatus::Pending => {},
        }
    }
}
