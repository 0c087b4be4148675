use serde::{Deserialize, Serialize};

use crate::db_types::{Money, PaymentStatus, TransactionId};

/// What a diner's client needs to launch the gateway's payment UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub transaction_id: TransactionId,
    pub merchant_id: String,
    pub gateway_token: String,
    pub callback_url: String,
    pub amount: Money,
}

/// Where a reconciliation takes its new status from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// Ask the payment gateway.
    Query,
    /// A status delivered by a trusted caller, such as a verified gateway callback.
    Explicit(PaymentStatus),
}

impl StatusSource {
    pub fn is_query(&self) -> bool {
        matches!(self, StatusSource::Query)
    }
}

/// Tally of a stale-payment sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Transactions examined.
    pub checked: usize,
    /// Transactions that reached a terminal status during the sweep.
    pub settled: usize,
    /// Transactions that are still `NotPaid` or `Pending`.
    pub unsettled: usize,
    /// Transactions that could not be reconciled. Each failure is logged.
    pub errors: usize,
}

impl ReconcileSummary {
    pub fn record(&mut self, status: PaymentStatus) {
        self.checked += 1;
        if status.is_terminal() {
            self.settled += 1;
        } else {
            self.unsettled += 1;
        }
    }

    pub fn record_error(&mut self) {
        self.checked += 1;
        self.errors += 1;
    }
}
