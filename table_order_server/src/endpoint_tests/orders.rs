use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use table_order_engine::{
    db_types::{MenuItem, Money, Order, OrderId, OrderItem, PaymentStatus, Restaurant, Table, TaxRate},
    OrderFlowApi,
    OrderFlowError,
};

use super::{
    helpers::{get_request, issue_token, post_request},
    mocks::MockBackend,
};
use crate::routes::{MenuRoute, MergeItemsRoute, OpenOrderRoute, OrderByIdRoute};

#[actix_web::test]
async fn fetch_menu() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("diner-1");
    let (status, body) =
        get_request(&token, "/menu?restaurant_id=saravana&table_id=saravana-t1", |cfg| configure(cfg, menu_backend()))
            .await;
    assert_eq!(status, StatusCode::OK);
    let menu: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(menu["restaurant"]["tax_percent"], "18.00");
    assert_eq!(menu["table"]["id"], "saravana-t1");
    assert_eq!(menu["items"][0]["id"], "dosa");
    assert_eq!(menu["items"][0]["price"], 10000);
}

#[actix_web::test]
async fn fetch_menu_for_another_restaurants_table() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("diner-1");
    let (status, body) =
        get_request(&token, "/menu?restaurant_id=saravana&table_id=anjappar-t1", |cfg| configure(cfg, menu_backend()))
            .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "NotFound");
}

#[actix_web::test]
async fn open_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = menu_backend();
    backend.expect_insert_order().times(1).returning(|o| {
        assert_eq!(o.user_id.as_str(), "diner-1");
        Ok(order(o.id.as_str(), "diner-1", 0, PaymentStatus::NotPaid))
    });
    let token = issue_token("diner-1");
    let body = json!({"restaurant_id": "saravana", "table_id": "saravana-t1"});
    let (status, body) = post_request(&token, "/order", &body, |cfg| configure(cfg, backend)).await;
    assert_eq!(status, StatusCode::OK);
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["tax_percent"], "18.00");
    assert!(!result["order_id"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn merge_items() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_merge_items().times(1).returning(|id, user, lines| {
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 2);
        Ok(order(id.as_str(), user.as_str(), 260_00, PaymentStatus::NotPaid))
    });
    let token = issue_token("diner-1");
    let body = json!({"order_id": "o-1", "order_list": [{"menu_id": "dosa", "quantity": 2}, {"menu_id": "idli", "quantity": 1}]});
    let (status, body) = post_request(&token, "/order_items", &body, |cfg| configure(cfg, backend)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"subtotal":26000}"#);
}

#[actix_web::test]
async fn merge_items_rejects_bad_quantities_before_touching_the_store() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_merge_items().never();
    let token = issue_token("diner-1");
    let body = json!({"order_id": "o-1", "order_list": [{"menu_id": "dosa", "quantity": 16}]});
    let (status, body) = post_request(&token, "/order_items", &body, |cfg| configure(cfg, backend)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "InvalidArgument");
}

#[actix_web::test]
async fn merge_items_into_a_checked_out_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_merge_items().returning(|id, _, _| Err(OrderFlowError::OrderFrozen(id.clone())));
    let token = issue_token("diner-1");
    let body = json!({"order_id": "o-1", "order_list": [{"menu_id": "dosa", "quantity": 1}]});
    let (status, body) = post_request(&token, "/order_items", &body, |cfg| configure(cfg, backend)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "Conflict");
    assert_eq!(err["error"], "Order o-1 has been checked out. Its cart can no longer be changed");
}

#[actix_web::test]
async fn malformed_body() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("diner-1");
    let body = json!({"order_list": "dosa"});
    let (status, body) = post_request(&token, "/order_items", &body, |cfg| configure(cfg, MockBackend::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "InvalidArgument");
}

#[actix_web::test]
async fn fetch_my_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_order().returning(|id| Ok(Some(order(id.as_str(), "diner-1", 100_00, PaymentStatus::NotPaid))));
    backend.expect_fetch_order_items().returning(|id| {
        Ok(vec![OrderItem { order_id: id.clone(), menu_item_id: "dosa".into(), quantity: 1, price: Money::from(100_00) }])
    });
    backend.expect_fetch_transactions_for_order().returning(|_| Ok(vec![]));
    let token = issue_token("diner-1");
    let (status, body) = get_request(&token, "/order/o-1", |cfg| configure(cfg, backend)).await;
    assert_eq!(status, StatusCode::OK);
    let snapshot: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(snapshot["order"]["id"], "o-1");
    assert_eq!(snapshot["order"]["payment_status"], "NOT_PAID");
    assert_eq!(snapshot["items"][0]["quantity"], 1);
    assert_eq!(snapshot["transactions"], json!([]));
}

#[actix_web::test]
async fn fetch_someone_elses_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_order().returning(|id| Ok(Some(order(id.as_str(), "diner-1", 100_00, PaymentStatus::NotPaid))));
    backend.expect_fetch_order_items().never();
    let token = issue_token("mallory");
    let (status, body) = get_request(&token, "/order/o-1", |cfg| configure(cfg, backend)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "Unauthorized");
}

fn configure(cfg: &mut ServiceConfig, backend: MockBackend) {
    let api = OrderFlowApi::new(backend);
    cfg.service(MenuRoute::<MockBackend>::new())
        .service(OpenOrderRoute::<MockBackend>::new())
        .service(OrderByIdRoute::<MockBackend>::new())
        .service(MergeItemsRoute::<MockBackend>::new())
        .app_data(web::Data::new(api));
}

fn menu_backend() -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_fetch_restaurant().returning(|id| {
        Ok(Some(Restaurant {
            id: id.clone(),
            owner_id: "owner".into(),
            name: "Saravana Bhavan".into(),
            tax_percent: TaxRate::from_percent(18),
            created_at: timestamp(),
            updated_at: timestamp(),
        }))
    });
    backend.expect_fetch_table().returning(|id| {
        let restaurant = id.as_str().trim_end_matches("-t1");
        Ok(Some(Table { id: id.clone(), restaurant_id: restaurant.into(), name: "Table 1".into(), created_at: timestamp() }))
    });
    backend.expect_fetch_menu().returning(|id| {
        Ok(vec![MenuItem {
            id: "dosa".into(),
            restaurant_id: id.clone(),
            name: "Masala Dosa".into(),
            price: Money::from(100_00),
            active: true,
            created_at: timestamp(),
        }])
    });
    backend
}

fn order(id: &str, user: &str, subtotal: i64, status: PaymentStatus) -> Order {
    Order {
        id: OrderId::from(id),
        user_id: user.into(),
        restaurant_id: "saravana".into(),
        table_id: "saravana-t1".into(),
        payment_status: status,
        price_excluding_tax: Money::from(subtotal),
        tax: Money::from(0),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

fn timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 19, 30, 0).unwrap()
}
