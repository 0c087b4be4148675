use chrono::Utc;
use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{MenuItem, MenuItemId, NewMenuItem, NewRestaurant, NewTable, Restaurant, RestaurantId, Table, TableId},
    traits::OrderFlowError,
};

pub async fn fetch_restaurant(
    id: &RestaurantId,
    conn: &mut SqliteConnection,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM restaurant WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await
}

pub async fn fetch_table(id: &TableId, conn: &mut SqliteConnection) -> Result<Option<Table>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tables WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await
}

/// Fetches all the menu items with the given ids in one query. Unknown ids are ignored.
pub async fn fetch_menu_items(ids: &[MenuItemId], conn: &mut SqliteConnection) -> Result<Vec<MenuItem>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM menu WHERE id IN (");
    let mut list = builder.separated(", ");
    for id in ids {
        list.push_bind(id.as_str());
    }
    builder.push(")");
    trace!("🗃️ Executing query: {}", builder.sql());
    builder.build_query_as::<MenuItem>().fetch_all(conn).await
}

pub async fn fetch_active_menu(
    restaurant_id: &RestaurantId,
    conn: &mut SqliteConnection,
) -> Result<Vec<MenuItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM menu WHERE restaurant_id = $1 AND active = TRUE ORDER BY name ASC")
        .bind(restaurant_id.as_str())
        .fetch_all(conn)
        .await
}

pub async fn insert_restaurant(
    restaurant: NewRestaurant,
    conn: &mut SqliteConnection,
) -> Result<Restaurant, OrderFlowError> {
    let now = Utc::now();
    let restaurant = sqlx::query_as(
        r#"
            INSERT INTO restaurant (id, owner_id, name, tax_percent, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *;
        "#,
    )
    .bind(restaurant.id)
    .bind(restaurant.owner_id)
    .bind(restaurant.name)
    .bind(restaurant.tax_percent)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(restaurant)
}

pub async fn insert_table(table: NewTable, conn: &mut SqliteConnection) -> Result<Table, OrderFlowError> {
    let table = sqlx::query_as(
        "INSERT INTO tables (id, restaurant_id, name, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(table.id)
    .bind(table.restaurant_id)
    .bind(table.name)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(table)
}

pub async fn insert_menu_item(item: NewMenuItem, conn: &mut SqliteConnection) -> Result<MenuItem, OrderFlowError> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO menu (id, restaurant_id, name, price, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(item.id)
    .bind(item.restaurant_id)
    .bind(item.name)
    .bind(item.price)
    .bind(item.active)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn set_menu_item_active(
    id: &MenuItemId,
    active: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as("UPDATE menu SET active = $1 WHERE id = $2 RETURNING *")
        .bind(active)
        .bind(id.as_str())
        .fetch_optional(conn)
        .await
}
