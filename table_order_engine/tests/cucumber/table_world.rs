use std::{collections::HashMap, fmt::Debug, time::Duration};

use cucumber::World;
use log::*;
use table_order_engine::{
    db_types::{OrderId, TransactionId},
    events::EventProducers,
    test_utils::{prepare_test_env, random_db_path, seed_catalog, ScriptedGateway, TestCatalog},
    CheckoutApi,
    OrderFlowApi,
    OrderFlowError,
    SqliteDatabase,
};

pub const GATEWAY_TIMEOUT: Duration = Duration::from_millis(250);

/// Orders and payments are referred to by the aliases used in the feature files (`E1`, `P1`, ...).
#[derive(Default, World)]
pub struct TableWorld {
    pub system: Option<OrderSystem>,
    pub orders: HashMap<String, OrderId>,
    pub payments: HashMap<String, TransactionId>,
    pub last_error: Option<OrderFlowError>,
}

impl Debug for TableWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableWorld")
            .field("db_path", &self.system.as_ref().map(|s| s.db_path.as_str()))
            .field("orders", &self.orders)
            .field("payments", &self.payments)
            .field("last_error", &self.last_error)
            .finish()
    }
}

pub struct OrderSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub catalog: TestCatalog,
    pub gateway: ScriptedGateway,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub checkout: CheckoutApi<SqliteDatabase, ScriptedGateway>,
}

impl OrderSystem {
    pub async fn new() -> Self {
        let db_path = random_db_path();
        let db = prepare_test_env(&db_path).await;
        let catalog = seed_catalog(&db).await;
        debug!("🚀️ Created database: {db_path}");
        let gateway = ScriptedGateway::new();
        let orders = OrderFlowApi::new(db.clone());
        let checkout = CheckoutApi::new(db.clone(), gateway.clone(), GATEWAY_TIMEOUT, EventProducers::default());
        Self { db_path, db, catalog, gateway, orders, checkout }
    }
}

impl TableWorld {
    pub fn system(&self) -> &OrderSystem {
        self.system.as_ref().expect("The order system has not been initialised")
    }

    pub fn order_id(&self, alias: &str) -> OrderId {
        self.orders.get(alias).cloned().unwrap_or_else(|| panic!("No order called {alias}"))
    }

    pub fn payment_id(&self, alias: &str) -> TransactionId {
        self.payments.get(alias).cloned().unwrap_or_else(|| panic!("No payment called {alias}"))
    }

    /// Stores the error of a call that is allowed to fail, so that a later step can inspect it.
    pub fn record<T>(&mut self, result: Result<T, OrderFlowError>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_error = None;
                Some(v)
            },
            Err(e) => {
                debug!("🚀️ Call failed: {e}");
                self.last_error = Some(e);
                None
            },
        }
    }
}
