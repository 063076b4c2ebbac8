//! # Delivery of worker lifecycle events to observers.
//!
//! The control loop publishes on the [`Bus`] and never waits for observers. The
//! builder's listener hands every event to a [`SubscriberSet`], which gives each
//! observer its own bounded mailbox and delivery task:
//!
//! ```text
//! bus ─► listener ─► SubscriberSet::emit ─┬─► mailbox ─► on_event (metrics)
//!                                         └─► mailbox ─► on_event (LogWriter)
//! ```
//!
//! A slow observer loses events (reported as `SubscriberOverflow`), it never
//! delays `kill`, `wait` or the next `handle`. A panicking observer is reported as
//! `SubscriberPanicked` and keeps receiving later events. Each observer sees the
//! worker's events in publish order; there is no ordering across observers.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::error::WorkerError;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Sending side of one observer's mailbox.
struct Mailbox {
    observer: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Observers of one worker, each behind its own mailbox.
pub struct SubscriberSet {
    mailboxes: Vec<Mailbox>,
    deliveries: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Opens a mailbox and starts a delivery task for every observer.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (mailboxes, deliveries): (Vec<_>, Vec<_>) = subs
            .into_iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let mailbox = Mailbox {
                    observer: sub.name(),
                    tx,
                };
                (mailbox, tokio::spawn(deliver(sub, rx, bus.clone())))
            })
            .unzip();

        Self {
            mailboxes,
            deliveries,
            bus,
        }
    }

    /// Drops `event` into every mailbox without waiting.
    ///
    /// A full or closed mailbox loses the event and a `SubscriberOverflow` is
    /// published instead. Overflow reports are never themselves reported.
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());

        for mailbox in &self.mailboxes {
            let reason = match mailbox.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "full",
                Err(TrySendError::Closed(_)) => "closed",
            };
            if !event.is_subscriber_overflow() {
                self.bus
                    .publish(Event::subscriber_overflow(mailbox.observer, reason));
            }
        }
    }

    /// Closes every mailbox and waits until observers have drained them.
    pub async fn shutdown(self) {
        drop(self.mailboxes);
        for delivery in self.deliveries {
            let _ = delivery.await;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mailboxes.is_empty()
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mailboxes.len()
    }
}

/// Feeds one observer until its mailbox closes.
async fn deliver(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        if let Err(payload) = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await {
            let info = WorkerError::from_panic(payload).to_string();
            bus.publish(Event::subscriber_panicked(sub.name(), info));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        seen: Arc<Mutex<Vec<EventKind>>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber blew up");
        }
        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_drains_on_shutdown() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let bus = Bus::new(16);
        let set = SubscriberSet::new(
            vec![Arc::new(Recorder { seen: seen.clone() })],
            bus,
        );
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::SetUpCompleted));
        set.emit(&Event::new(EventKind::TornDown));
        set.shutdown().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::SetUpCompleted, EventKind::TornDown]
        );
    }

    #[tokio::test]
    async fn panics_are_reported_on_the_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Panicker)], bus);

        set.emit(&Event::new(EventKind::ChangeHandled));
        set.shutdown().await;

        let ev = rx.recv().await.expect("panic event");
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.worker.as_deref(), Some("panicker"));
        assert_eq!(ev.reason.as_deref(), Some("panicked: subscriber blew up"));
    }

    #[tokio::test]
    async fn empty_set_accepts_events() {
        let set = SubscriberSet::new(Vec::new(), Bus::new(1));
        assert!(set.is_empty());
        set.emit(&Event::new(EventKind::WorkerDead));
        set.shutdown().await;
    }
}
