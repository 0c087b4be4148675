use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewTransaction, OrderId, PaymentStatus, Transaction, TransactionId},
    traits::{GatewayHandle, OrderFlowError},
};

pub async fn insert(transaction: NewTransaction, conn: &mut SqliteConnection) -> Result<Transaction, OrderFlowError> {
    let now = Utc::now();
    let id = transaction.id.clone();
    let transaction: Transaction = sqlx::query_as(
        r#"
            INSERT INTO transactions (id, order_id, user_id, price, payment_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *;
        "#,
    )
    .bind(transaction.id)
    .bind(transaction.order_id)
    .bind(transaction.user_id)
    .bind(transaction.price)
    .bind(PaymentStatus::NotPaid)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            OrderFlowError::InvalidArgument(format!("Transaction {id} already exists"))
        },
        _ => OrderFlowError::from(e),
    })?;
    debug!("🗃️ Transaction {} for {} inserted on order {}", transaction.id, transaction.price, transaction.order_id);
    Ok(transaction)
}

pub async fn fetch(id: &TransactionId, conn: &mut SqliteConnection) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await
}

pub async fn fetch_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE order_id = $1 ORDER BY created_at ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await
}

pub async fn count_for_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// Returns the id of a `Successful` transaction on the order other than `exclude`, if there is one.
pub async fn other_successful(
    order_id: &OrderId,
    exclude: &TransactionId,
    conn: &mut SqliteConnection,
) -> Result<Option<TransactionId>, sqlx::Error> {
    let row: Option<(TransactionId,)> = sqlx::query_as(
        "SELECT id FROM transactions WHERE order_id = $1 AND id != $2 AND payment_status = $3 LIMIT 1",
    )
    .bind(order_id.as_str())
    .bind(exclude.as_str())
    .bind(PaymentStatus::Successful)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|(id,)| id))
}

/// Stores the gateway handle on a transaction that does not have one yet.
pub async fn attach_handle(
    id: &TransactionId,
    handle: &GatewayHandle,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE transactions SET gateway_token = $1, callback_url = $2, updated_at = $3
            WHERE id = $4 AND gateway_token IS NULL
            RETURNING *;
        "#,
    )
    .bind(handle.token.as_str())
    .bind(handle.callback_url.as_str())
    .bind(Utc::now())
    .bind(id.as_str())
    .fetch_optional(conn)
    .await
}

/// Deletes a reservation that never received a gateway handle. Returns whether a row was removed.
pub async fn delete_unopened(id: &TransactionId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM transactions WHERE id = $1 AND gateway_token IS NULL AND payment_status = $2")
            .bind(id.as_str())
            .bind(PaymentStatus::NotPaid)
            .execute(conn)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Writes the new status. The partial unique index on settled transactions rejects a second `Successful` row for
/// the same order with a unique violation.
pub async fn set_status(
    id: &TransactionId,
    status: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("UPDATE transactions SET payment_status = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(status)
        .bind(Utc::now())
        .bind(id.as_str())
        .fetch_optional(conn)
        .await
}

pub async fn fetch_unsettled(
    older_than: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT * FROM transactions
            WHERE payment_status IN ($1, $2) AND gateway_token IS NOT NULL AND updated_at <= $3
            ORDER BY created_at ASC;
        "#,
    )
    .bind(PaymentStatus::NotPaid)
    .bind(PaymentStatus::Pending)
    .bind(older_than)
    .fetch_all(conn)
    .await
}
