use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use log::*;
use serde_json::Value;
use table_order_engine::{db_types::UserId, OrderFlowApi};

use super::{
    helpers::{get_request, issue_token},
    mocks::MockBackend,
};
use crate::{auth::JwtClaims, routes::OrderByIdRoute};

#[actix_web::test]
async fn request_without_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/order/o-1", configure).await;
    info!("Response body: {body}");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["kind"], "Unauthenticated");
    assert_eq!(err["error"], "Authentication Error. No access token was provided.");
}

#[actix_web::test]
async fn request_with_nonsense_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("made up nonsense", "/order/o-1", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Access token is not in the correct format."), "was: {body}");
}

#[actix_web::test]
async fn request_with_tampered_token() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token("diner-1");
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    debug!("Calling /order with invalid token {token}");
    let (status, body) = get_request(&token, "/order/o-1", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Access token signature is invalid."), "was: {body}");
}

#[actix_web::test]
async fn request_with_expired_token() {
    let _ = env_logger::try_init().ok();
    let claims = JwtClaims { user_id: UserId::from("diner-1"), exp: (Utc::now() - Duration::hours(2)).timestamp() };
    let token =
        encode(&Header::default(), &claims, &EncodingKey::from_secret(super::helpers::TEST_JWT_SECRET.as_bytes()))
            .unwrap();
    let (status, _) = get_request(&token, "/order/o-1", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// Requests that fail authentication must never reach the backend
fn configure(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_order().never();
    cfg.service(OrderByIdRoute::<MockBackend>::new()).app_data(web::Data::new(OrderFlowApi::new(backend)));
}
