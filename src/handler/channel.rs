//! # Channel-backed watch source.
//!
//! [`ChannelSource`] adapts an in-process [`tokio::sync::mpsc`] channel into a
//! [`WatchSource`]; the paired [`Notifier`] is the producing side.
//!
//! ## Rules
//! - The channel holds **one** pending notification: bursts sent while the worker is
//!   busy collapse into a single `changed()` wake-up.
//! - [`Notifier::fail`] ends the stream and records the error reported by `err()`.
//! - Dropping every notifier ends the stream with no error.
//! - [`ChannelSource::release`] closes the channel; later `notify` calls return `false`.
//!
//! ## Example
//! ```rust
//! use watchvisor::ChannelSource;
//!
//! let (notifier, source) = ChannelSource::new();
//! assert!(notifier.notify());
//! assert!(notifier.notify()); // coalesced with the pending one
//! # drop(source);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::handler::source::WatchSource;

/// State shared by a source and its notifiers.
#[derive(Default)]
struct Shared {
    failed: CancellationToken,
    error: Mutex<Option<WorkerError>>,
}

/// Producing side of a [`ChannelSource`].
///
/// Cheap to clone; every clone feeds the same source.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<()>,
    shared: Arc<Shared>,
}

impl Notifier {
    /// Signals a change.
    ///
    /// Returns `false` once the source has been released or dropped.
    pub fn notify(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }

    /// Ends the stream with `error`; the source reports it from `err()`.
    ///
    /// Only the first failure is kept.
    pub fn fail(&self, error: WorkerError) {
        {
            let mut slot = self.shared.error.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                *slot = Some(error);
            }
        }
        self.shared.failed.cancel();
    }

    /// True once the source has been released or dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// [`WatchSource`] fed by one or more [`Notifier`]s.
pub struct ChannelSource {
    rx: mpsc::Receiver<()>,
    shared: Arc<Shared>,
}

impl ChannelSource {
    /// Creates a connected notifier/source pair.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (Notifier, ChannelSource) {
        let (tx, rx) = mpsc::channel(1);
        let shared = Arc::new(Shared::default());
        (
            Notifier {
                tx,
                shared: Arc::clone(&shared),
            },
            ChannelSource { rx, shared },
        )
    }
}

#[async_trait]
impl WatchSource for ChannelSource {
    async fn changed(&mut self) -> Option<()> {
        tokio::select! {
            biased;
            _ = self.shared.failed.cancelled() => None,
            change = self.rx.recv() => change,
        }
    }

    fn err(&self) -> Option<WorkerError> {
        self.shared
            .error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn release(&mut self) -> Result<(), WorkerError> {
        self.rx.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bursts_are_coalesced() {
        let (notifier, mut source) = ChannelSource::new();
        assert!(notifier.notify());
        assert!(notifier.notify());
        assert!(notifier.notify());

        assert_eq!(source.changed().await, Some(()));

        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            source.changed(),
        )
        .await;
        assert!(pending.is_err(), "burst should wake the source only once");
    }

    #[tokio::test]
    async fn fail_ends_stream_and_reports_first_error() {
        let (notifier, mut source) = ChannelSource::new();
        notifier.fail(WorkerError::fail("watcher broke"));
        notifier.fail(WorkerError::fail("ignored"));

        assert_eq!(source.changed().await, None);
        assert_eq!(source.err(), Some(WorkerError::fail("watcher broke")));
    }

    #[tokio::test]
    async fn dropping_notifiers_ends_stream_without_error() {
        let (notifier, mut source) = ChannelSource::new();
        drop(notifier);

        assert_eq!(source.changed().await, None);
        assert!(source.err().is_none());
    }

    #[tokio::test]
    async fn release_closes_the_channel() {
        let (notifier, mut source) = ChannelSource::new();
        assert!(!notifier.is_closed());

        source.release().await.expect("release");

        assert!(notifier.is_closed());
        assert!(!notifier.notify());
    }
}
