//! Engine events and the hooks that subscribe to them.
//!
//! Register closures on an [`EventHooks`], turn them into [`EventHandlers`], hand the resulting [`EventProducers`] to
//! the API that emits the events, and start the handlers.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
