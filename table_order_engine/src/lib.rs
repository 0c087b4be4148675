//! Table Order Engine
//!
//! The engine behind restaurant table ordering: diners open an order at a table, build up a cart, check out and pay
//! through a third-party payment gateway. This library holds the order, cart, checkout and payment reconciliation
//! logic. It knows nothing about HTTP or about any particular payment provider.
//!
//! The library is divided into these sections:
//! 1. The data types used throughout the engine ([`db_types`]).
//! 2. The backend traits ([`traits`]). A storage backend implements [`CatalogManagement`], [`OrderManagement`] and
//!    [`CheckoutManagement`]. A payment provider is plugged in by implementing [`PaymentGateway`]. SQLite is the
//!    supported backend ([`SqliteDatabase`]).
//! 3. The public API ([`OrderFlowApi`] and [`CheckoutApi`]). Clients should use these rather than calling a backend
//!    directly, since the APIs carry the validation and the gateway coordination.
//!
//! The engine emits events when a payment settles. See [`events`] for how to hook into them.
pub mod db_types;
pub mod events;
#[cfg(feature = "sqlite")]
mod sqlite;
mod toe_api;
pub mod traits;

#[cfg(all(feature = "sqlite", any(feature = "test_utils", test)))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{db::db_url, SqliteDatabase};
pub use toe_api::{
    checkout_api::CheckoutApi,
    checkout_objects,
    order_flow_api::OrderFlowApi,
    order_objects,
};
pub use traits::{
    CatalogManagement,
    CheckoutManagement,
    ErrorKind,
    GatewayError,
    GatewayHandle,
    OrderFlowError,
    OrderManagement,
    PaymentGateway,
    StatusUpdate,
};
