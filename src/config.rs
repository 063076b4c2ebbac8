//! # Per-worker configuration.
//!
//! Provides [`WorkerConfig`], the settings a [`Supervisor`](crate::Supervisor) is built with.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by the event bus

use std::borrow::Cow;

/// Configuration for a single watch worker.
///
/// ## Field semantics
/// - `name`: label used in events and `Display` (e.g. `logger`, `upgrader`)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Human-readable worker name attached to every published event.
    pub name: Cow<'static, str>,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Subscribers that lag behind more than `bus_capacity` events
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl WorkerConfig {
    /// Default configuration with the given worker name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for WorkerConfig {
    /// Default configuration:
    ///
    /// - `name = "worker"`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("worker"),
            bus_capacity: 1024,
        }
    }
}
