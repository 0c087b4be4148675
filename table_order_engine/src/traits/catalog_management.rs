use crate::{
    db_types::{MenuItem, MenuItemId, Restaurant, RestaurantId, Table, TableId},
    traits::OrderFlowError,
};

/// Read-only access to the restaurant catalog. Catalog administration happens elsewhere.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_restaurant(&self, id: &RestaurantId) -> Result<Option<Restaurant>, OrderFlowError>;

    async fn fetch_table(&self, id: &TableId) -> Result<Option<Table>, OrderFlowError>;

    /// Fetches every menu item in `ids` in a single read. Missing ids are simply absent from the result.
    async fn fetch_menu_items(&self, ids: &[MenuItemId]) -> Result<Vec<MenuItem>, OrderFlowError>;

    /// The active menu items for a restaurant, ordered by name.
    async fn fetch_menu(&self, restaurant_id: &RestaurantId) -> Result<Vec<MenuItem>, OrderFlowError>;
}
