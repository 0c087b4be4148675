#![allow(dead_code)]
use std::time::Duration;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use table_order_engine::{
    events::EventProducers,
    test_utils::{prepare_test_env, random_db_path, seed_catalog, ScriptedGateway, TestCatalog},
    CheckoutApi,
    OrderFlowApi,
    SqliteDatabase,
};

pub const GATEWAY_TIMEOUT: Duration = Duration::from_millis(250);

pub struct TestSystem {
    pub db: SqliteDatabase,
    pub catalog: TestCatalog,
    pub gateway: ScriptedGateway,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub checkout: CheckoutApi<SqliteDatabase, ScriptedGateway>,
}

impl TestSystem {
    pub async fn new() -> Self {
        Self::with_producers(EventProducers::default()).await
    }

    pub async fn with_producers(producers: EventProducers) -> Self {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        let catalog = seed_catalog(&db).await;
        let gateway = ScriptedGateway::new();
        let orders = OrderFlowApi::new(db.clone());
        let checkout = CheckoutApi::new(db.clone(), gateway.clone(), GATEWAY_TIMEOUT, producers);
        Self { db, catalog, gateway, orders, checkout }
    }

    pub async fn tear_down(mut self) {
        let url = self.db.url().to_string();
        drop(self.orders);
        drop(self.checkout);
        if let Err(e) = self.db.close().await {
            error!("🚀️ Failed to close database: {e}");
        }
        if let Err(e) = Sqlite::drop_database(&url).await {
            warn!("🚀️ Could not remove test database {url}: {e}");
        }
    }
}
