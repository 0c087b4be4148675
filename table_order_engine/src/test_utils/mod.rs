//! Helpers for tests that run against a real SQLite store. Enabled with the `test_utils` feature.
pub mod fixtures;
pub mod prepare_env;
pub mod scripted_gateway;

pub use fixtures::{seed_catalog, set_menu_item_active, TestCatalog};
pub use prepare_env::{prepare_test_env, random_db_path};
pub use scripted_gateway::{OpenBehaviour, ScriptedGateway};
