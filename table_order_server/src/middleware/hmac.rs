//! Signature checks for payment gateway callbacks.
//!
//! The callback relay signs the raw request body with HMAC-SHA256 under `TOS_GATEWAY_HMAC_SECRET` and sends the base64
//! signature in a header (`X-Gateway-Signature` in production). Wrap every callback scope with
//! [`HmacMiddlewareFactory`]: a request with a missing or wrong signature is answered with a 403 and never reaches the
//! handler.
//!
//! With `TOS_GATEWAY_HMAC_CHECKS=false` every request is let through. Only do this in development.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::HeaderMap,
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use tos_common::{helpers::verify_hmac, Secret};

use crate::errors::ServerError;

struct SignatureCheck {
    header: String,
    key: Secret<String>,
    enabled: bool,
}

impl SignatureCheck {
    fn verify(&self, headers: &HeaderMap, body: &[u8], path: &str) -> Result<(), ServerError> {
        let signature = headers.get(&self.header).and_then(|v| v.to_str().ok()).ok_or_else(|| {
            warn!("🔐️ Request to {path} has no {} header. Denying access.", self.header);
            ServerError::Forbidden("No HMAC signature found.".into())
        })?;
        if verify_hmac(self.key.reveal(), body, signature) {
            trace!("🔐️ HMAC check for {path} ✅️");
            Ok(())
        } else {
            warn!("🔐️ Invalid HMAC signature on request to {path}. Denying access.");
            Err(ServerError::Forbidden("Invalid HMAC signature.".into()))
        }
    }
}

pub struct HmacMiddlewareFactory {
    check: Rc<SignatureCheck>,
}

impl HmacMiddlewareFactory {
    pub fn new(header: &str, key: Secret<String>, enabled: bool) -> Self {
        Self { check: Rc::new(SignatureCheck { header: header.into(), key, enabled }) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService { check: Rc::clone(&self.check), service: Rc::new(service) }))
    }
}

pub struct HmacMiddlewareService<S> {
    check: Rc<SignatureCheck>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let check = Rc::clone(&self.check);
        Box::pin(async move {
            if !check.enabled {
                trace!("🔐️ HMAC checks are disabled. Letting {} through.", req.path());
                return service.call(req).await;
            }
            let body = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Could not read the body of {}. {e}", req.path());
                ServerError::InvalidRequestBody(e.to_string())
            })?;
            check.verify(req.headers(), &body, req.path())?;
            // The handler reads the body again
            req.set_payload(replay(body));
            service.call(req).await
        })
    }
}

fn replay(body: web::Bytes) -> Payload {
    let (_, mut payload) = h1::Payload::create(true);
    payload.unread_data(body);
    Payload::from(payload)
}
