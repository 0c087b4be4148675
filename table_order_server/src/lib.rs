//! # Table order server
//! This crate hosts the HTTP server for restaurant table ordering. It is responsible for:
//! * Authenticating diners from the access token in the `X-Auth-Token` header.
//! * Serving the menu, and the order, cart and checkout endpoints backed by the table order engine.
//! * Receiving signed payment callbacks from the payment gateway.
//! * Periodically reconciling payments that the gateway never called back about.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/version`: The server and SQLite versions.
//! * `/api/...`: The diner endpoints. See [routes](routes/index.html).
//! * `/gateway/callback`: The payment gateway's callback, authenticated by HMAC signature.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod reconcile_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
