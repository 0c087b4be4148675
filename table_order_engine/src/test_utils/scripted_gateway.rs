use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use log::*;
use tos_common::Money;

use crate::{
    db_types::{PaymentStatus, TransactionId, UserId},
    traits::{GatewayError, GatewayHandle, PaymentGateway},
};

/// How the [`ScriptedGateway`] responds to `open_transaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenBehaviour {
    Accept,
    Reject,
    /// Never answers, so the caller's timeout fires.
    Hang,
}

#[derive(Default)]
struct Script {
    open: Option<OpenBehaviour>,
    statuses: HashMap<TransactionId, PaymentStatus>,
}

/// An in-memory [`PaymentGateway`] whose answers are set by the test. Clones share the same script.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    script: Arc<Mutex<Script>>,
    opened: Arc<AtomicUsize>,
    queried: Arc<AtomicUsize>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_open_behaviour(&self, behaviour: OpenBehaviour) {
        self.lock().open = Some(behaviour);
    }

    /// The status the gateway reports for `id` from now on.
    pub fn set_status(&self, id: &TransactionId, status: PaymentStatus) {
        self.lock().statuses.insert(id.clone(), status);
    }

    pub fn open_calls(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.queried.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PaymentGateway for ScriptedGateway {
    fn merchant_id(&self) -> &str {
        "SCRIPTED-MERCHANT"
    }

    async fn open_transaction(
        &self,
        user: &UserId,
        transaction_id: &TransactionId,
        amount: Money,
    ) -> Result<GatewayHandle, GatewayError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let behaviour = self.lock().open.unwrap_or(OpenBehaviour::Accept);
        trace!("🚀️ Scripted gateway: open {transaction_id} for {user} ({amount}) -> {behaviour:?}");
        match behaviour {
            OpenBehaviour::Accept => Ok(GatewayHandle {
                token: format!("token-{transaction_id}"),
                callback_url: format!("https://gateway.test/callback?ORDER_ID={transaction_id}"),
            }),
            OpenBehaviour::Reject => Err(GatewayError::Rejected("scripted rejection".into())),
            OpenBehaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GatewayError::Timeout(Duration::from_secs(3600)))
            },
        }
    }

    async fn query_status(&self, transaction_id: &TransactionId) -> Result<PaymentStatus, GatewayError> {
        self.queried.fetch_add(1, Ordering::SeqCst);
        let status = self.lock().statuses.get(transaction_id).copied();
        status.ok_or_else(|| GatewayError::InvalidResponse(format!("No scripted status for {transaction_id}")))
    }
}
