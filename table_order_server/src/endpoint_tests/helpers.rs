use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use log::debug;
use serde::Serialize;
use table_order_engine::db_types::UserId;
use tos_common::helpers::calculate_hmac;

use crate::{
    auth::{JwtClaims, TokenValidator, AUTH_TOKEN_HEADER},
    config::AuthConfig,
    server::{json_config, GATEWAY_SIGNATURE_HEADER},
};

// DO NOT re-use these keys anywhere.
pub const TEST_JWT_SECRET: &str = "endpoint-tests-jwt-secret";
pub const TEST_HMAC_SECRET: &str = "endpoint-tests-hmac-secret";

pub fn issue_token(user: &str) -> String {
    let claims = JwtClaims { user_id: UserId::from(user), exp: (Utc::now() + Duration::days(1)).timestamp() };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()))
        .expect("Failed to sign token")
}

pub async fn get_request<F>(auth_token: &str, path: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let mut req = TestRequest::get().uri(path);
    if !auth_token.is_empty() {
        req = req.insert_header((AUTH_TOKEN_HEADER, auth_token));
    }
    send(req, configure).await
}

pub async fn post_request<F, T>(auth_token: &str, path: &str, body: &T, configure: F) -> (StatusCode, String)
where
    F: FnOnce(&mut ServiceConfig),
    T: Serialize,
{
    let mut req = TestRequest::post().uri(path).set_json(body);
    if !auth_token.is_empty() {
        req = req.insert_header((AUTH_TOKEN_HEADER, auth_token));
    }
    send(req, configure).await
}

/// Posts `body` as the gateway would, signed with `secret`.
pub async fn signed_post_request<F>(secret: &str, path: &str, body: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let signature = calculate_hmac(secret, body.as_bytes());
    let req = TestRequest::post()
        .uri(path)
        .insert_header(("Content-Type", "application/json"))
        .insert_header((GATEWAY_SIGNATURE_HEADER, signature))
        .set_payload(body.to_string());
    send(req, configure).await
}

async fn send<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let validator = TokenValidator::new(&AuthConfig::new(TEST_JWT_SECRET));
    let app = App::new().app_data(json_config()).app_data(web::Data::new(validator)).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (status, body) = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            (status, test::read_body(res).await)
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            (status, res.into_body().try_into_bytes().unwrap_or_default())
        },
    };
    (status, String::from_utf8_lossy(&body).into_owned())
}
