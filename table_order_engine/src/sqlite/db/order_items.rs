use sqlx::SqliteConnection;

use crate::{
    db_types::{MenuItemId, Money, OrderId, OrderItem},
    traits::OrderFlowError,
};

/// Inserts the line, or adds `quantity` and `price` to the existing line for the same menu item, in one statement.
pub async fn upsert(
    order_id: &OrderId,
    menu_item_id: &MenuItemId,
    quantity: i64,
    price: Money,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, OrderFlowError> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, menu_item_id, quantity, price) VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_id, menu_item_id) DO UPDATE SET
                quantity = quantity + excluded.quantity,
                price = price + excluded.price
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(menu_item_id.as_str())
    .bind(quantity)
    .bind(price)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_for_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY menu_item_id")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await
}
