use std::{collections::HashSet, fmt::Debug};

use log::*;

use crate::{
    db_types::{CartLine, NewOrder, Order, OrderId, Restaurant, RestaurantId, Table, TableId, UserId},
    toe_api::order_objects::{MenuView, MergeResult, OpenOrderResult, OrderSnapshot, MAX_LINE_QUANTITY},
    traits::{CatalogManagement, CheckoutManagement, OrderFlowError, OrderManagement},
};

/// `OrderFlowApi` handles the diner's side of an order: looking at the menu, opening an order at a table, and
/// building up the cart.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> OrderFlowApi<B>
where B: CatalogManagement
{
    /// Checks that the table belongs to the restaurant, and returns both.
    async fn locate_table(
        &self,
        restaurant_id: &RestaurantId,
        table_id: &TableId,
    ) -> Result<(Restaurant, Table), OrderFlowError> {
        let restaurant = self
            .db
            .fetch_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| OrderFlowError::RestaurantNotFound(restaurant_id.clone()))?;
        let table = self
            .db
            .fetch_table(table_id)
            .await?
            .filter(|t| &t.restaurant_id == restaurant_id)
            .ok_or_else(|| OrderFlowError::TableNotFound { restaurant: restaurant_id.clone(), table: table_id.clone() })?;
        Ok((restaurant, table))
    }

    /// The active menu for a restaurant, as seen from one of its tables.
    pub async fn fetch_menu(&self, restaurant_id: &RestaurantId, table_id: &TableId) -> Result<MenuView, OrderFlowError> {
        let (restaurant, table) = self.locate_table(restaurant_id, table_id).await?;
        let items = self.db.fetch_menu(restaurant_id).await?;
        trace!("🔄️ Menu for {restaurant_id} at table {table_id} has {} items", items.len());
        Ok(MenuView { restaurant, table, items })
    }
}

impl<B> OrderFlowApi<B>
where B: CatalogManagement + OrderManagement
{
    /// Opens a new, empty order for `user` at a table.
    ///
    /// The restaurant must exist and the table must belong to it, otherwise `NotFound` is returned. The new order has
    /// zero totals and `NotPaid` status. The restaurant's tax rate is returned so that clients can show the diner
    /// what will be added at checkout.
    pub async fn open_order(
        &self,
        user: &UserId,
        restaurant_id: &RestaurantId,
        table_id: &TableId,
    ) -> Result<OpenOrderResult, OrderFlowError> {
        let (restaurant, table) = self.locate_table(restaurant_id, table_id).await?;
        let order = self.db.insert_order(NewOrder::new(user.clone(), restaurant.id, table.id)).await?;
        info!("🔄️ Order {} opened by {user} at table {table_id} of {restaurant_id}", order.id);
        Ok(OpenOrderResult { order_id: order.id, tax_percent: restaurant.tax_percent })
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Fetches an order without any ownership check. Only trusted callers should use this.
    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        self.db.fetch_order(order_id).await
    }

    /// Adds the cart lines to an order.
    ///
    /// Each call is additive: merging `(item, 2)` and later `(item, 1)` leaves a quantity of 3. The whole batch is
    /// validated before anything is written and is rejected as a unit:
    /// * the list must be non-empty, every quantity must be in `1..16`, and no item may appear twice,
    /// * the order must exist and belong to `requester`,
    /// * every item must exist, be active, and be on the order's restaurant's menu,
    /// * the order must not have been paid or checked out.
    pub async fn merge_items(
        &self,
        order_id: &OrderId,
        requester: &UserId,
        lines: &[CartLine],
    ) -> Result<MergeResult, OrderFlowError> {
        validate_cart(lines)?;
        let order = self.db.merge_items(order_id, requester, lines).await?;
        debug!("🔄️ {} lines merged into order {order_id}. Subtotal: {}", lines.len(), order.price_excluding_tax);
        Ok(MergeResult { success: true, subtotal: order.price_excluding_tax })
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement + CheckoutManagement
{
    /// The order, its items and every checkout attempt on it. Only the order's owner may see it.
    pub async fn get_order(&self, order_id: &OrderId, requester: &UserId) -> Result<OrderSnapshot, OrderFlowError> {
        let order =
            self.db.fetch_order(order_id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if &order.user_id != requester {
            return Err(OrderFlowError::unauthorized(requester, format!("order {order_id}")));
        }
        let items = self.db.fetch_order_items(order_id).await?;
        let transactions = self.db.fetch_transactions_for_order(order_id).await?;
        Ok(OrderSnapshot { order, items, transactions })
    }
}

fn validate_cart(lines: &[CartLine]) -> Result<(), OrderFlowError> {
    if lines.is_empty() {
        return Err(OrderFlowError::InvalidArgument("The order list is empty".into()));
    }
    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if !(1..MAX_LINE_QUANTITY).contains(&line.quantity) {
            return Err(OrderFlowError::InvalidArgument(format!(
                "Quantity for {} must be between 1 and {}, not {}",
                line.menu_item_id,
                MAX_LINE_QUANTITY - 1,
                line.quantity
            )));
        }
        if !seen.insert(&line.menu_item_id) {
            return Err(OrderFlowError::InvalidArgument(format!(
                "Menu item {} appears more than once in the order list",
                line.menu_item_id
            )));
        }
    }
    Ok(())
}
