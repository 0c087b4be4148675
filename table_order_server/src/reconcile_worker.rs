use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{Duration, Utc};
use log::*;
use table_order_engine::{CheckoutApi, SqliteDatabase};
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::integrations::paytm::PaytmGateway;

/// Starts the payment reconciliation worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Diners sometimes close the payment page before the gateway calls back. Every `interval`, the worker asks the
/// gateway about each handed-off payment that has been quiet for at least `stale_after`, and settles it locally.
pub fn start_reconcile_worker(
    api: Arc<CheckoutApi<SqliteDatabase, PaytmGateway>>,
    interval: StdDuration,
    stale_after: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("🕰️ Payment reconciliation worker started");
        loop {
            timer.tick().await;
            let cutoff = Utc::now() - stale_after;
            trace!("🕰️ Reconciling payments that have been pending since {cutoff}");
            match api.reconcile_stale_payments(cutoff).await {
                Ok(summary) if summary.checked == 0 => trace!("🕰️ No stale payments"),
                Ok(summary) => {
                    info!(
                        "🕰️ Reconciled {} stale payments. {} settled, {} still pending, {} errors",
                        summary.checked, summary.settled, summary.unsettled, summary.errors
                    );
                },
                Err(e) => {
                    error!("🕰️ Error running the payment reconciliation job: {e}");
                },
            }
        }
    })
}
