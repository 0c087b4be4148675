//! # Table order engine public API
//!
//! * [`order_flow_api`] covers the diner's cart: the menu view, opening an order at a table, merging items into it
//!   and reading it back.
//! * [`checkout_api`] turns an order into a payment gateway transaction and reconciles its status with the gateway.
//!
//! An API instance is created by supplying a backend that implements the traits each API needs:
//!
//! ```rust,ignore
//! use table_order_engine::{OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/orders.db", 5).await?;
//! let api = OrderFlowApi::new(db);
//! let menu = api.fetch_menu(&restaurant_id, &table_id).await?;
//! ```
pub mod checkout_api;
pub mod checkout_objects;
pub mod order_flow_api;
pub mod order_objects;
