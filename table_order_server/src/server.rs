use std::{sync::Arc, time::Duration};

use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
};
use log::*;
use table_order_engine::{CheckoutApi, OrderFlowApi, SqliteDatabase};

use crate::{
    auth::TokenValidator,
    config::ServerConfig,
    errors::ServerError,
    integrations::{payment_events::create_payment_event_handlers, paytm::PaytmGateway},
    middleware::HmacMiddlewareFactory,
    reconcile_worker::start_reconcile_worker,
    routes::{
        health,
        version,
        CheckoutRoute,
        GatewayCallbackRoute,
        MenuRoute,
        MergeItemsRoute,
        OpenOrderRoute,
        OrderByIdRoute,
        PaymentStatusRoute,
    },
};

pub const GATEWAY_SIGNATURE_HEADER: &str = "X-Gateway-Signature";

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = PaytmGateway::new(config.paytm.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_payment_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers();
    let checkout_api = Arc::new(CheckoutApi::new(db.clone(), gateway, config.gateway_timeout, producers));
    let _worker = start_reconcile_worker(checkout_api.clone(), config.reconcile_interval, config.stale_payment_age);
    let srv = create_server_instance(config, db, checkout_api)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    checkout_api: Arc<CheckoutApi<SqliteDatabase, PaytmGateway>>,
) -> Result<Server, ServerError> {
    let checkout_api = web::Data::from(checkout_api);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let validator = TokenValidator::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("tos::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(orders_api))
            .app_data(checkout_api.clone())
            .app_data(web::Data::new(validator))
            .app_data(web::Data::new(config.proxy));
        // Routes that require an access token
        let api_scope = web::scope("/api")
            .service(MenuRoute::<SqliteDatabase>::new())
            .service(OpenOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(MergeItemsRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase, PaytmGateway>::new())
            .service(PaymentStatusRoute::<SqliteDatabase, PaytmGateway>::new());
        let hmac_middleware = HmacMiddlewareFactory::new(
            GATEWAY_SIGNATURE_HEADER,
            config.callback.hmac_secret.clone(),
            config.callback.hmac_checks,
        );
        let gateway_scope = web::scope("/gateway")
            .wrap(hmac_middleware)
            .service(GatewayCallbackRoute::<SqliteDatabase, PaytmGateway>::new());
        app.service(health).service(version).service(api_scope).service(gateway_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies get the same error shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        debug!("💻️ Rejected request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

