//! Checkout and payment endpoints, run against a real SQLite store and a scripted payment gateway.
use std::time::Duration;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::{json, Value};
use table_order_engine::{
    db_types::{PaymentStatus, TransactionId},
    events::EventProducers,
    test_utils::{prepare_test_env, random_db_path, seed_catalog, OpenBehaviour, ScriptedGateway, TestCatalog},
    CheckoutApi,
    OrderFlowApi,
    SqliteDatabase,
};
use tos_common::Secret;

use super::helpers::{get_request, issue_token, post_request, signed_post_request, TEST_HMAC_SECRET};
use crate::{
    middleware::HmacMiddlewareFactory,
    routes::{CheckoutRoute, GatewayCallbackRoute, MergeItemsRoute, OpenOrderRoute, OrderByIdRoute, PaymentStatusRoute},
    server::GATEWAY_SIGNATURE_HEADER,
};

struct TestServer {
    db: SqliteDatabase,
    gateway: ScriptedGateway,
    catalog: TestCatalog,
}

impl TestServer {
    async fn new() -> Self {
        let db = prepare_test_env(&random_db_path()).await;
        let catalog = seed_catalog(&db).await;
        Self { db, gateway: ScriptedGateway::new(), catalog }
    }

    fn configure(&self) -> impl FnOnce(&mut ServiceConfig) {
        let db = self.db.clone();
        let gateway = self.gateway.clone();
        move |cfg: &mut ServiceConfig| {
            let orders = OrderFlowApi::new(db.clone());
            let checkout = CheckoutApi::new(db, gateway, Duration::from_millis(250), EventProducers::default());
            let hmac = HmacMiddlewareFactory::new(GATEWAY_SIGNATURE_HEADER, Secret::new(TEST_HMAC_SECRET.into()), true);
            cfg.app_data(web::Data::new(orders))
                .app_data(web::Data::new(checkout))
                .service(OpenOrderRoute::<SqliteDatabase>::new())
                .service(OrderByIdRoute::<SqliteDatabase>::new())
                .service(MergeItemsRoute::<SqliteDatabase>::new())
                .service(CheckoutRoute::<SqliteDatabase, ScriptedGateway>::new())
                .service(PaymentStatusRoute::<SqliteDatabase, ScriptedGateway>::new())
                .service(
                    web::scope("/gateway")
                        .wrap(hmac)
                        .service(GatewayCallbackRoute::<SqliteDatabase, ScriptedGateway>::new()),
                );
        }
    }

    /// Opens an order for `user` with two dosas and an idli in the cart: 260.00 before tax.
    async fn order_with_cart(&self, user: &str) -> String {
        let token = issue_token(user);
        let location = json!({"restaurant_id": self.catalog.restaurant, "table_id": self.catalog.table});
        let (status, body) = post_request(&token, "/order", &location, self.configure()).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let order_id = serde_json::from_str::<Value>(&body).unwrap()["order_id"].as_str().unwrap().to_string();
        let cart = json!({
            "order_id": order_id,
            "order_list": [{"menu_id": self.catalog.dosa, "quantity": 2}, {"menu_id": self.catalog.idli, "quantity": 1}]
        });
        let (status, body) = post_request(&token, "/order_items", &cart, self.configure()).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        order_id
    }

    async fn checkout(&self, user: &str, order_id: &str) -> (StatusCode, Value) {
        let token = issue_token(user);
        let (status, body) = post_request(&token, "/checkout", &json!({"order_id": order_id}), self.configure()).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    async fn order(&self, user: &str, order_id: &str) -> Value {
        let token = issue_token(user);
        let (status, body) = get_request(&token, &format!("/order/{order_id}"), self.configure()).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        serde_json::from_str(&body).unwrap()
    }
}

#[actix_web::test]
async fn checkout_and_get_paid_by_callback() {
    let server = TestServer::new().await;
    let order_id = server.order_with_cart("diner-1").await;

    let (status, result) = server.checkout("diner-1", &order_id).await;
    assert_eq!(status, StatusCode::OK);
    // 260.00 + 18% tax
    assert_eq!(result["amount"], 306_80);
    assert_eq!(result["merchant_id"], "SCRIPTED-MERCHANT");
    let tx_id = result["transaction_id"].as_str().unwrap().to_string();
    assert_eq!(result["gateway_token"], format!("token-{tx_id}"));

    let callback = json!({"transaction_id": tx_id, "cust_id": "diner-1", "status": "SUCCESSFUL"}).to_string();
    let (status, body) = signed_post_request(TEST_HMAC_SECRET, "/gateway/callback", &callback, server.configure()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, r#"{"payment_status":"SUCCESSFUL"}"#);

    let snapshot = server.order("diner-1", &order_id).await;
    assert_eq!(snapshot["order"]["payment_status"], "SUCCESSFUL");
    assert_eq!(snapshot["order"]["tax"], 46_80);
    assert_eq!(snapshot["transactions"][0]["payment_status"], "SUCCESSFUL");

    // Paid orders cannot be checked out again
    let (status, err) = server.checkout("diner-1", &order_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], "Conflict");
}

#[actix_web::test]
async fn callback_with_a_bad_signature_is_refused() {
    let server = TestServer::new().await;
    let order_id = server.order_with_cart("diner-1").await;
    let (_, result) = server.checkout("diner-1", &order_id).await;
    let tx_id = result["transaction_id"].as_str().unwrap().to_string();

    let callback = json!({"transaction_id": tx_id, "cust_id": "diner-1", "status": "SUCCESSFUL"}).to_string();
    let (status, _) = signed_post_request("not-the-secret", "/gateway/callback", &callback, server.configure()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let snapshot = server.order("diner-1", &order_id).await;
    assert_eq!(snapshot["order"]["payment_status"], "NOT_PAID");
    assert_eq!(snapshot["transactions"][0]["payment_status"], "NOT_PAID");
}

#[actix_web::test]
async fn checkout_while_the_gateway_is_down() {
    let server = TestServer::new().await;
    let order_id = server.order_with_cart("diner-1").await;
    server.gateway.set_open_behaviour(OpenBehaviour::Hang);

    let (status, err) = server.checkout("diner-1", &order_id).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(err["kind"], "GatewayUnavailable");

    // Nothing was left behind, so the cart is still open
    let snapshot = server.order("diner-1", &order_id).await;
    assert_eq!(snapshot["transactions"], json!([]));
    assert_eq!(snapshot["order"]["tax"], 0);
    let token = issue_token("diner-1");
    let cart = json!({"order_id": order_id, "order_list": [{"menu_id": server.catalog.vada, "quantity": 1}]});
    let (status, body) = post_request(&token, "/order_items", &cart, server.configure()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"subtotal":30550}"#);
}

#[actix_web::test]
async fn payment_status_follows_the_gateway() {
    let server = TestServer::new().await;
    let order_id = server.order_with_cart("diner-1").await;
    let (_, result) = server.checkout("diner-1", &order_id).await;
    let tx_id = TransactionId::from(result["transaction_id"].as_str().unwrap());
    let token = issue_token("diner-1");
    let request = json!({"transaction_id": tx_id});

    server.gateway.set_status(&tx_id, PaymentStatus::Pending);
    let (status, body) = post_request(&token, "/payment_status", &request, server.configure()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"payment_status":"PENDING"}"#);

    server.gateway.set_status(&tx_id, PaymentStatus::Failed);
    let (_, body) = post_request(&token, "/payment_status", &request, server.configure()).await;
    assert_eq!(body, r#"{"payment_status":"FAILED"}"#);

    // Failed is final, even if the gateway changes its mind
    server.gateway.set_status(&tx_id, PaymentStatus::Successful);
    let (_, body) = post_request(&token, "/payment_status", &request, server.configure()).await;
    assert_eq!(body, r#"{"payment_status":"FAILED"}"#);
    assert_eq!(server.gateway.query_calls(), 2);
}

#[actix_web::test]
async fn someone_elses_payment() {
    let server = TestServer::new().await;
    let order_id = server.order_with_cart("diner-1").await;
    let (status, _) = server.checkout("mallory", &order_id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, result) = server.checkout("diner-1", &order_id).await;
    let tx_id = result["transaction_id"].as_str().unwrap().to_string();
    let token = issue_token("mallory");
    let (status, body) =
        post_request(&token, "/payment_status", &json!({"transaction_id": tx_id}), server.configure()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "Unauthorized");
}
