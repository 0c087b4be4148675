use std::str::FromStr;

use cucumber::{then, when};
use table_order_engine::{
    checkout_objects::StatusSource,
    db_types::{CartLine, Money, PaymentStatus, UserId},
    test_utils::OpenBehaviour,
    CheckoutManagement,
};

use crate::cucumber::TableWorld;

fn money(s: &str) -> Money {
    Money::from_str(s).unwrap_or_else(|e| panic!("{s} is not an amount: {e}"))
}

fn status(s: &str) -> PaymentStatus {
    PaymentStatus::from_str(s).unwrap_or_else(|e| panic!("{e}"))
}

#[when(expr = "diner {string} opens order {word} at table {word} of {word}")]
async fn open_order(world: &mut TableWorld, user: String, alias: String, table: String, restaurant: String) {
    let result =
        world.system().orders.open_order(&UserId::from(user), &restaurant.as_str().into(), &table.as_str().into()).await;
    if let Some(opened) = world.record(result) {
        world.orders.insert(alias, opened.order_id);
    }
}

#[when(expr = "diner {string} adds {int} of {word} to order {word}")]
async fn add_items(world: &mut TableWorld, user: String, quantity: i64, item: String, alias: String) {
    let order_id = world.order_id(&alias);
    let result = world.system().orders.merge_items(&order_id, &UserId::from(user), &[CartLine::new(item, quantity)]).await;
    world.record(result);
}

#[when(expr = "diner {string} adds {int} of {word} and {int} of {word} to order {word}")]
async fn add_two_items(
    world: &mut TableWorld,
    user: String,
    q1: i64,
    item1: String,
    q2: i64,
    item2: String,
    alias: String,
) {
    let order_id = world.order_id(&alias);
    let lines = [CartLine::new(item1, q1), CartLine::new(item2, q2)];
    let result = world.system().orders.merge_items(&order_id, &UserId::from(user), &lines).await;
    world.record(result);
}

#[when(expr = "diner {string} checks out order {word} as payment {word}")]
async fn check_out(world: &mut TableWorld, user: String, alias: String, payment: String) {
    let order_id = world.order_id(&alias);
    let result = world.system().checkout.checkout(&order_id, &UserId::from(user)).await;
    if let Some(checkout) = world.record(result) {
        world.payments.insert(payment, checkout.transaction_id);
    }
}

#[when(expr = "the gateway is down")]
async fn gateway_down(world: &mut TableWorld) {
    world.system().gateway.set_open_behaviour(OpenBehaviour::Reject);
}

#[when(expr = "the gateway is back")]
async fn gateway_up(world: &mut TableWorld) {
    world.system().gateway.set_open_behaviour(OpenBehaviour::Accept);
}

#[when(expr = "the gateway reports payment {word} as {word}")]
async fn gateway_reports(world: &mut TableWorld, payment: String, new_status: String) {
    let id = world.payment_id(&payment);
    world.system().gateway.set_status(&id, status(&new_status));
}

#[when(expr = "diner {string} asks for the status of payment {word}")]
async fn query_status(world: &mut TableWorld, user: String, payment: String) {
    let id = world.payment_id(&payment);
    let result = world.system().checkout.reconcile_payment_status(&id, &UserId::from(user), StatusSource::Query).await;
    world.record(result);
}

#[when(expr = "the gateway calls back with payment {word} for diner {string} as {word}")]
async fn callback(world: &mut TableWorld, payment: String, user: String, new_status: String) {
    let id = world.payment_id(&payment);
    let source = StatusSource::Explicit(status(&new_status));
    let result = world.system().checkout.reconcile_payment_status(&id, &UserId::from(user), source).await;
    world.record(result);
}

#[then(expr = "the last call succeeded")]
async fn last_call_succeeded(world: &mut TableWorld) {
    assert!(world.last_error.is_none(), "Expected success, got {:?}", world.last_error);
}

#[then(expr = "the last call failed with {word}")]
async fn last_call_failed(world: &mut TableWorld, kind: String) {
    let err = world.last_error.as_ref().expect("The last call did not fail");
    assert_eq!(format!("{:?}", err.kind()), kind, "Unexpected error: {err}");
}

#[then(expr = "order {word} has a subtotal of {word}")]
async fn check_subtotal(world: &mut TableWorld, alias: String, amount: String) {
    let order = world.system().orders.fetch_order(&world.order_id(&alias)).await.unwrap().expect("order exists");
    assert_eq!(order.price_excluding_tax, money(&amount));
}

#[then(expr = "order {word} has tax of {word}")]
async fn check_tax(world: &mut TableWorld, alias: String, amount: String) {
    let order = world.system().orders.fetch_order(&world.order_id(&alias)).await.unwrap().expect("order exists");
    assert_eq!(order.tax, money(&amount));
}

#[then(expr = "order {word} is {word}")]
async fn check_order_status(world: &mut TableWorld, alias: String, expected: String) {
    let order = world.system().orders.fetch_order(&world.order_id(&alias)).await.unwrap().expect("order exists");
    assert_eq!(order.payment_status, status(&expected));
}

#[then(expr = "order {word} has {int} of {word}")]
async fn check_quantity(world: &mut TableWorld, alias: String, quantity: i64, item: String) {
    let system = world.system();
    let owner = {
        let order = system.orders.fetch_order(&world.order_id(&alias)).await.unwrap().expect("order exists");
        order.user_id
    };
    let snapshot = system.orders.get_order(&world.order_id(&alias), &owner).await.unwrap();
    let found = snapshot.items.iter().find(|i| i.menu_item_id.as_str() == item).map(|i| i.quantity).unwrap_or(0);
    assert_eq!(found, quantity);
}

#[then(expr = "order {word} has {int} payment(s)")]
async fn check_payment_count(world: &mut TableWorld, alias: String, count: usize) {
    let txs = world.system().db.fetch_transactions_for_order(&world.order_id(&alias)).await.unwrap();
    assert_eq!(txs.len(), count);
}

#[then(expr = "payment {word} is for {word} and is {word}")]
async fn check_payment(world: &mut TableWorld, payment: String, amount: String, expected: String) {
    let tx = world.system().db.fetch_transaction(&world.payment_id(&payment)).await.unwrap().expect("payment exists");
    assert_eq!(tx.price, money(&amount));
    assert_eq!(tx.payment_status, status(&expected));
}
