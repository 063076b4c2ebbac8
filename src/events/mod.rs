//! Worker events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the control loop, `Supervisor::kill`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the supervisor's subscriber listener (fans out to `SubscriberSet`)
//!   and any receiver obtained from `Supervisor::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
