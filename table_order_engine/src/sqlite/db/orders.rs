use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Money, NewOrder, Order, OrderId, PaymentStatus, TransactionId},
    traits::OrderFlowError,
};

/// Inserts a new order using the given connection. The order starts as `NotPaid` with zero totals.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    let now = Utc::now();
    let order_id = order.id.clone();
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (id, user_id, restaurant_id, table_id, payment_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *;
        "#,
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.restaurant_id)
    .bind(order.table_id)
    .bind(PaymentStatus::NotPaid)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            OrderFlowError::InvalidArgument(format!("Order {order_id} already exists"))
        },
        _ => OrderFlowError::from(e),
    })?;
    debug!("🗃️ Order {} inserted for user {}", order.id, order.user_id);
    Ok(order)
}

pub async fn fetch_order(id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await
}

/// Takes the database write lock with a no-op update of the order row and returns the order.
///
/// This must be the first statement of a mutating transaction. Nothing in the row changes.
pub async fn lock_order(id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("UPDATE orders SET updated_at = updated_at WHERE id = $1 RETURNING *")
        .bind(id.as_str())
        .fetch_optional(conn)
        .await
}

/// As [`lock_order`], for the order that owns the given transaction.
pub async fn lock_order_for_transaction(
    transaction_id: &TransactionId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE orders SET updated_at = updated_at
            WHERE id = (SELECT order_id FROM transactions WHERE id = $1)
            RETURNING *;
        "#,
    )
    .bind(transaction_id.as_str())
    .fetch_optional(conn)
    .await
}

/// Adds `amount` to the order subtotal in place.
pub async fn increment_subtotal(
    id: &OrderId,
    amount: Money,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET price_excluding_tax = price_excluding_tax + $1, updated_at = $2
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(amount)
    .bind(Utc::now())
    .bind(id.as_str())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| OrderFlowError::OrderNotFound(id.clone()))?;
    Ok(order)
}

pub async fn set_tax(id: &OrderId, tax: Money, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    let order = sqlx::query_as("UPDATE orders SET tax = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(tax)
        .bind(Utc::now())
        .bind(id.as_str())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| OrderFlowError::OrderNotFound(id.clone()))?;
    Ok(order)
}

pub async fn set_payment_status(
    id: &OrderId,
    status: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let order = sqlx::query_as("UPDATE orders SET payment_status = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(status)
        .bind(Utc::now())
        .bind(id.as_str())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| OrderFlowError::OrderNotFound(id.clone()))?;
    Ok(order)
}
