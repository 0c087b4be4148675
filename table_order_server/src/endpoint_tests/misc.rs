use actix_web::{http::StatusCode, web};
use serde_json::Value;
use table_order_engine::test_utils::{prepare_test_env, random_db_path};

use super::helpers::get_request;
use crate::routes::{health, version};

#[actix_web::test]
async fn health_needs_no_token() {
    let (status, body) = get_request("", "/health", |cfg| {
        cfg.service(health);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn version_reports_the_store() {
    let db = prepare_test_env(&random_db_path()).await;
    let (status, body) = get_request("", "/version", move |cfg| {
        cfg.app_data(web::Data::new(db)).service(version);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let info: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert!(info["sqlite_version"].as_str().unwrap().starts_with('3'));
}
