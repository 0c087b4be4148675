//! Glue between the engine and the outside world: the Paytm payment gateway, and what happens when a payment settles.
pub mod paytm;
pub mod payment_events;
