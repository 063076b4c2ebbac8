//! # Lifecycle events emitted by watch workers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Loop events**: set up, change handling, kill requests
//! - **Unwind events**: watch source release, handler tear down, final death
//! - **Subscriber events**: overflow and panic reports from the fan-out
//!
//! The [`Event`] struct carries additional metadata such as timestamps, worker name,
//! reasons and handled-change counters.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use watchvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::HandleFailed)
//!     .with_worker("logger")
//!     .with_reason("boom")
//!     .with_handled(3);
//!
//! assert_eq!(ev.kind, EventKind::HandleFailed);
//! assert_eq!(ev.worker.as_deref(), Some("logger"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of worker events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `worker`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `worker`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Loop events ===
    /// Handler set up succeeded and its watch source was adopted.
    ///
    /// Sets:
    /// - `worker`: worker name
    SetUpCompleted,

    /// Handler set up failed (or produced no watch source).
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: failure message
    SetUpFailed,

    /// The control loop observed a shutdown request while waiting for changes.
    ///
    /// Published once, before `Released`. A kill that arrives after the loop already
    /// failed publishes nothing.
    ///
    /// Sets:
    /// - `worker`: worker name
    KillRequested,

    /// A change notification was handled successfully.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `handled`: number of changes handled so far (1-based)
    ChangeHandled,

    /// Handling a change failed; the loop exits.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `handled`: number of changes handled successfully before the failure
    /// - `reason`: failure message
    HandleFailed,

    /// The watch source stopped producing notifications.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: the source's reported error, or the generic closed message
    WatchClosed,

    // === Unwind events ===
    /// The adopted watch source was released cleanly.
    ///
    /// Sets:
    /// - `worker`: worker name
    Released,

    /// Releasing the adopted watch source failed.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: release error
    ReleaseFailed,

    /// Handler tear down finished.
    ///
    /// Sets:
    /// - `worker`: worker name
    TornDown,

    /// Terminal event: the control loop finished and its result is latched.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: terminal error (absent on clean shutdown)
    WorkerDead,
}

/// Worker event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the worker (or subscriber), if applicable.
    pub worker: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Count of successfully handled changes.
    pub handled: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            reason: None,
            handled: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a handled-change counter.
    #[inline]
    pub fn with_handled(mut self, n: u64) -> Self {
        self.handled = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_worker(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_worker(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for the last event a worker ever publishes.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::WorkerDead)
    }
}
