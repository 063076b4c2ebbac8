//! # Observer contract for worker lifecycle events.
//!
//! Implement [`Subscribe`] to watch a worker from the outside: count handled
//! changes, alert on a `WorkerDead` with a reason, forward events to a log sink.
//! Observers are attached with
//! [`SupervisorBuilder::with_subscribers`](crate::SupervisorBuilder::with_subscribers)
//! and see every event from `SetUpCompleted` to `WorkerDead`.
//!
//! `on_event` runs on the observer's own delivery task, so it may await I/O freely.
//! What it cannot do is slow the worker down: once its mailbox of
//! [`Subscribe::queue_capacity`] events is full, further events are dropped for that
//! observer alone.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use watchvisor::{Event, EventKind, Subscribe};
//!
//! struct Alerts;
//!
//! #[async_trait]
//! impl Subscribe for Alerts {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::WorkerDead) && ev.reason.is_some() {
//!             // page someone...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "alerts" }
//!     fn queue_capacity(&self) -> usize { 64 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Mailbox size used when an observer does not pick one.
const DEFAULT_MAILBOX: usize = 1024;

/// Observer of one or more watch workers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Called once per delivered event, in publish order.
    async fn on_event(&self, event: &Event);

    /// Name carried by the overflow and panic events reported for this observer.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Mailbox size; zero is treated as one.
    fn queue_capacity(&self) -> usize {
        DEFAULT_MAILBOX
    }
}
