use futures::future::BoxFuture;
use log::*;
use table_order_engine::events::{EventHandlers, EventHooks, OrderPaidEvent, PaymentFailedEvent};

pub const PAYMENT_EVENT_BUFFER_SIZE: usize = 25;

/// Event handlers for settled payments.
///
/// 1. OrderPaidEvent - the kitchen log records that the order's table has paid.
/// 2. PaymentFailedEvent - the failure is logged so that staff can follow up with the diner.
pub fn create_payment_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(log_order_paid).on_payment_failed(log_payment_failed);
    EventHandlers::new(PAYMENT_EVENT_BUFFER_SIZE, hooks)
}

fn log_order_paid(ev: OrderPaidEvent) -> BoxFuture<'static, ()> {
    let OrderPaidEvent { order, transaction } = ev;
    Box::pin(async move {
        info!(
            "📬️ Order {} at table {} of {} has been paid. Transaction {} for {}",
            order.id, order.table_id, order.restaurant_id, transaction.id, transaction.price
        );
    })
}

fn log_payment_failed(ev: PaymentFailedEvent) -> BoxFuture<'static, ()> {
    let status = ev.status();
    let PaymentFailedEvent { order, transaction } = ev;
    Box::pin(async move {
        warn!(
            "📬️ Payment {} for order {} at table {} failed with status {status}. The diner may try again.",
            transaction.id, order.id, order.table_id
        );
    })
}
