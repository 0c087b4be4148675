//! `SqliteDatabase` is a concrete implementation of a table order engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::{collections::HashMap, fmt::Debug};

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{catalog, db_url, new_pool, order_items, orders, transactions};
use crate::{
    db_types::{
        CartLine,
        MenuItem,
        MenuItemId,
        Money,
        NewOrder,
        NewTransaction,
        Order,
        OrderId,
        OrderItem,
        PaymentStatus,
        Restaurant,
        RestaurantId,
        Table,
        TableId,
        Transaction,
        TransactionId,
        UserId,
    },
    traits::{
        CatalogManagement,
        CheckoutManagement,
        GatewayHandle,
        OrderFlowError,
        OrderManagement,
        StatusUpdate,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `TOS_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    pub async fn sqlite_version(&self) -> Result<String, sqlx::Error> {
        let (version,): (String,) = sqlx::query_as("SELECT sqlite_version()").fetch_one(&self.pool).await?;
        Ok(version)
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

/// Checks a cart against the menu rows fetched for it and returns the unit price of every line.
fn price_lines(order: &Order, lines: &[CartLine], items: Vec<MenuItem>) -> Result<Vec<Money>, OrderFlowError> {
    let menu = items.into_iter().map(|i| (i.id.clone(), i)).collect::<HashMap<MenuItemId, MenuItem>>();
    let mut restaurant: Option<&RestaurantId> = None;
    let mut prices = Vec::with_capacity(lines.len());
    for line in lines {
        let item = menu.get(&line.menu_item_id).ok_or_else(|| {
            OrderFlowError::InvalidArgument(format!("Menu item {} does not exist", line.menu_item_id))
        })?;
        if !item.active {
            return Err(OrderFlowError::InvalidArgument(format!("Menu item {} is no longer available", item.id)));
        }
        match restaurant {
            Some(r) if r != &item.restaurant_id => {
                return Err(OrderFlowError::InvalidArgument("The items are from different restaurants".into()));
            },
            Some(_) => {},
            None => restaurant = Some(&item.restaurant_id),
        }
        prices.push(item.price);
    }
    if let Some(r) = restaurant {
        if r != &order.restaurant_id {
            return Err(OrderFlowError::InvalidArgument(format!(
                "The items are not on the menu of restaurant {}",
                order.restaurant_id
            )));
        }
    }
    Ok(prices)
}

/// Line totals for the cart, and the sum they add to the order. Fails if any amount, or the new subtotal, overflows.
fn line_totals(order: &Order, lines: &[CartLine], prices: &[Money]) -> Result<(Vec<Money>, Money), OrderFlowError> {
    let too_large = || OrderFlowError::InvalidArgument(format!("The total for order {} is too large", order.id));
    let mut added = Money::default();
    let mut totals = Vec::with_capacity(lines.len());
    for (line, unit_price) in lines.iter().zip(prices) {
        let line_total = unit_price.checked_mul(line.quantity).ok_or_else(too_large)?;
        added = added.checked_add(line_total).ok_or_else(too_large)?;
        totals.push(line_total);
    }
    // Every item row is part of the subtotal, so this bounds the item rows too
    order.price_excluding_tax.checked_add(added).ok_or_else(too_large)?;
    Ok((totals, added))
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_restaurant(&self, id: &RestaurantId) -> Result<Option<Restaurant>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_restaurant(id, &mut conn).await?)
    }

    async fn fetch_table(&self, id: &TableId) -> Result<Option<Table>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_table(id, &mut conn).await?)
    }

    async fn fetch_menu_items(&self, ids: &[MenuItemId]) -> Result<Vec<MenuItem>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_menu_items(ids, &mut conn).await?)
    }

    async fn fetch_menu(&self, restaurant_id: &RestaurantId) -> Result<Vec<MenuItem>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_active_menu(restaurant_id, &mut conn).await?)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order(order_id, &mut conn).await?)
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(order_items::fetch_for_order(order_id, &mut conn).await?)
    }

    async fn merge_items(
        &self,
        order_id: &OrderId,
        requester: &UserId,
        lines: &[CartLine],
    ) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::lock_order(order_id, &mut tx).await?.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if &order.user_id != requester {
            return Err(OrderFlowError::unauthorized(requester, format!("order {order_id}")));
        }
        let ids = lines.iter().map(|l| l.menu_item_id.clone()).collect::<Vec<_>>();
        let items = catalog::fetch_menu_items(&ids, &mut tx).await?;
        let prices = price_lines(&order, lines, items)?;
        if order.payment_status == PaymentStatus::Successful {
            return Err(OrderFlowError::AlreadyPaid(order_id.clone()));
        }
        if transactions::count_for_order(order_id, &mut tx).await? > 0 {
            return Err(OrderFlowError::OrderFrozen(order_id.clone()));
        }
        let (totals, added) = line_totals(&order, lines, &prices)?;
        for (line, line_total) in lines.iter().zip(totals) {
            let item = order_items::upsert(order_id, &line.menu_item_id, line.quantity, line_total, &mut tx).await?;
            trace!("🗃️ Order {order_id}: {} now has quantity {} ({})", item.menu_item_id, item.quantity, item.price);
        }
        let order = orders::increment_subtotal(order_id, added, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {order_id}: {} lines merged, subtotal is now {}", lines.len(), order.price_excluding_tax);
        Ok(order)
    }
}

impl CheckoutManagement for SqliteDatabase {
    async fn fetch_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch(id, &mut conn).await?)
    }

    async fn fetch_transactions_for_order(&self, order_id: &OrderId) -> Result<Vec<Transaction>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_for_order(order_id, &mut conn).await?)
    }

    async fn begin_checkout(
        &self,
        order_id: &OrderId,
        requester: &UserId,
        transaction_id: &TransactionId,
    ) -> Result<(Order, Transaction), OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::lock_order(order_id, &mut tx).await?.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if &order.user_id != requester {
            return Err(OrderFlowError::unauthorized(requester, format!("order {order_id}")));
        }
        if order.payment_status == PaymentStatus::Successful {
            return Err(OrderFlowError::AlreadyPaid(order_id.clone()));
        }
        if order.price_excluding_tax <= Money::default() {
            return Err(OrderFlowError::InvalidArgument(format!("Order {order_id} has nothing to check out")));
        }
        // Tax is frozen with the first transaction. Later attempts pay the same total, whatever the rate is now.
        let order = if transactions::count_for_order(order_id, &mut tx).await? > 0 {
            trace!("🗃️ Order {order_id} is already frozen with tax {}", order.tax);
            order
        } else {
            let restaurant = catalog::fetch_restaurant(&order.restaurant_id, &mut tx)
                .await?
                .ok_or_else(|| OrderFlowError::RestaurantNotFound(order.restaurant_id.clone()))?;
            let tax = restaurant
                .tax_percent
                .tax_on(order.price_excluding_tax)
                .map_err(|e| OrderFlowError::InvalidArgument(e.to_string()))?;
            debug!("🗃️ Order {order_id} taxed at {}%: {tax}", restaurant.tax_percent);
            orders::set_tax(order_id, tax, &mut tx).await?
        };
        let price = order.price_excluding_tax.checked_add(order.tax).ok_or_else(|| {
            OrderFlowError::InvalidArgument(format!("The total for order {order_id} is too large"))
        })?;
        let new_tx = NewTransaction {
            id: transaction_id.clone(),
            order_id: order_id.clone(),
            user_id: order.user_id.clone(),
            price,
        };
        let transaction = transactions::insert(new_tx, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Checkout reserved for order {order_id}: subtotal {} + tax {} = {}",
            order.price_excluding_tax, order.tax, transaction.price
        );
        Ok((order, transaction))
    }

    async fn attach_gateway_handle(
        &self,
        transaction_id: &TransactionId,
        handle: &GatewayHandle,
    ) -> Result<Transaction, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        transactions::attach_handle(transaction_id, handle, &mut conn)
            .await?
            .ok_or_else(|| OrderFlowError::TransactionNotFound(transaction_id.clone()))
    }

    async fn abandon_checkout(&self, transaction_id: &TransactionId) -> Result<(), OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let Some(order) = orders::lock_order_for_transaction(transaction_id, &mut tx).await? else {
            warn!("🗃️ Abandoned checkout {transaction_id} has already gone");
            return Ok(());
        };
        if !transactions::delete_unopened(transaction_id, &mut tx).await? {
            warn!("🗃️ Checkout {transaction_id} already has a gateway handle. It will not be deleted.");
            return Ok(());
        }
        if transactions::count_for_order(&order.id, &mut tx).await? == 0 {
            orders::set_tax(&order.id, Money::default(), &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Checkout {transaction_id} on order {} rolled back", order.id);
        Ok(())
    }

    async fn update_payment_status(
        &self,
        transaction_id: &TransactionId,
        status: PaymentStatus,
    ) -> Result<StatusUpdate, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::lock_order_for_transaction(transaction_id, &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::TransactionNotFound(transaction_id.clone()))?;
        let current = transactions::fetch(transaction_id, &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::TransactionNotFound(transaction_id.clone()))?;
        let from = current.payment_status;
        if from.is_terminal() {
            trace!("🗃️ Transaction {transaction_id} is already {from}. Nothing to write.");
            return Ok(StatusUpdate::Unchanged(current));
        }
        if transactions::other_successful(&order.id, transaction_id, &mut tx).await?.is_some() {
            return Err(OrderFlowError::PaidByOtherTransaction(order.id));
        }
        if from == status {
            return Ok(StatusUpdate::Unchanged(current));
        }
        if !from.can_transition_to(status) {
            return Err(OrderFlowError::IllegalTransition { from, to: status });
        }
        if !order.payment_status.order_can_adopt(status) {
            return Err(OrderFlowError::AlreadyPaid(order.id));
        }
        let transaction = transactions::set_status(transaction_id, status, &mut tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(err) if err.is_unique_violation() => {
                    OrderFlowError::PaidByOtherTransaction(order.id.clone())
                },
                _ => OrderFlowError::from(e),
            })?
            .ok_or_else(|| OrderFlowError::TransactionNotFound(transaction_id.clone()))?;
        let order = orders::set_payment_status(&order.id, status, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Transaction {transaction_id} and order {} moved from {from} to {status}", order.id);
        Ok(StatusUpdate::Updated { order, transaction })
    }

    async fn fetch_unsettled_transactions(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_unsettled(older_than, &mut conn).await?)
    }
}
