//! # Event subscribers for watch workers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out
//! used to deliver events broadcast through the [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! control loop ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet::emit(&Event)
//!                                                                  ┌─────────┬─────────┐
//!                                                                  ▼         ▼         ▼
//!                                                             LogWriter   Metrics   Custom
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
