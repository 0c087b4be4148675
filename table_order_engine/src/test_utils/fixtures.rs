use tos_common::{Money, TaxRate};

use crate::{
    db_types::{MenuItem, MenuItemId, NewMenuItem, NewRestaurant, NewTable, RestaurantId, TableId, UserId},
    sqlite::db::catalog,
    SqliteDatabase,
};

/// Ids of the catalog rows created by [`seed_catalog`].
///
/// * `saravana` (18% tax) with table `saravana-t1` and items `dosa` (100.00), `idli` (60.00), `vada` (45.50) and
///   the retired `filter-coffee` (30.00).
/// * `anjappar` (5% tax) with table `anjappar-t1` and item `biryani` (250.00).
#[derive(Debug, Clone)]
pub struct TestCatalog {
    pub restaurant: RestaurantId,
    pub table: TableId,
    pub dosa: MenuItemId,
    pub idli: MenuItemId,
    pub vada: MenuItemId,
    pub retired: MenuItemId,
    pub other_restaurant: RestaurantId,
    pub other_table: TableId,
    pub biryani: MenuItemId,
}

pub async fn seed_catalog(db: &SqliteDatabase) -> TestCatalog {
    let mut conn = db.pool().acquire().await.expect("Could not get a connection");
    let owner = UserId::from("owner");
    for (id, name, tax) in [("saravana", "Saravana Bhavan", 18), ("anjappar", "Anjappar", 5)] {
        let restaurant = NewRestaurant {
            id: id.into(),
            owner_id: owner.clone(),
            name: name.into(),
            tax_percent: TaxRate::from_percent(tax),
        };
        catalog::insert_restaurant(restaurant, &mut conn).await.expect("Could not insert restaurant");
        let table = NewTable { id: format!("{id}-t1").into(), restaurant_id: id.into(), name: "Table 1".into() };
        catalog::insert_table(table, &mut conn).await.expect("Could not insert table");
    }
    let items = [
        ("dosa", "saravana", "Masala Dosa", 100_00, true),
        ("idli", "saravana", "Idli", 60_00, true),
        ("vada", "saravana", "Medu Vada", 45_50, true),
        ("filter-coffee", "saravana", "Filter Coffee", 30_00, false),
        ("biryani", "anjappar", "Chicken Biryani", 250_00, true),
    ];
    for (id, restaurant, name, price, active) in items {
        let item = NewMenuItem {
            id: id.into(),
            restaurant_id: restaurant.into(),
            name: name.into(),
            price: Money::from(price),
            active,
        };
        catalog::insert_menu_item(item, &mut conn).await.expect("Could not insert menu item");
    }
    TestCatalog {
        restaurant: "saravana".into(),
        table: "saravana-t1".into(),
        dosa: "dosa".into(),
        idli: "idli".into(),
        vada: "vada".into(),
        retired: "filter-coffee".into(),
        other_restaurant: "anjappar".into(),
        other_table: "anjappar-t1".into(),
        biryani: "biryani".into(),
    }
}

pub async fn set_menu_item_active(db: &SqliteDatabase, id: &MenuItemId, active: bool) -> MenuItem {
    let mut conn = db.pool().acquire().await.expect("Could not get a connection");
    catalog::set_menu_item_active(id, active, &mut conn)
        .await
        .expect("Could not update menu item")
        .expect("Menu item does not exist")
}
