//! # Backend contracts
//!
//! This module defines the behaviour that storage backends and the payment gateway adapter must expose in order to
//! drive the order and checkout flows.
//!
//! * [`CatalogManagement`] gives read access to restaurants, tables and menu items.
//! * [`OrderManagement`] owns orders and their line items, including the atomic cart merge.
//! * [`CheckoutManagement`] owns transactions: the checkout reservation, its compensation and payment status writes.
//! * [`PaymentGateway`] wraps the external payment provider.
//!
//! Backends are responsible for atomicity. Every method that mutates more than one row runs inside a single store
//! transaction and either commits everything or nothing.
mod catalog_management;
mod checkout_management;
mod errors;
mod order_management;
mod payment_gateway;

pub use catalog_management::CatalogManagement;
pub use checkout_management::{CheckoutManagement, StatusUpdate};
pub use errors::{ErrorKind, OrderFlowError};
pub use order_management::OrderManagement;
pub use payment_gateway::{GatewayError, GatewayHandle, PaymentGateway};
