//! # Watch source abstraction.
//!
//! A [`WatchSource`] produces a notification each time the watched state changes.
//! The supervisor treats every notification purely as a trigger to run
//! [`WorkHandler::handle`](crate::WorkHandler::handle); payloads are never inspected,
//! so sources are free to coalesce bursts.
//!
//! Ownership moves from the handler to the supervisor when `set_up` returns the
//! source. From then on the supervisor alone calls [`WatchSource::release`].

use async_trait::async_trait;

use crate::error::WorkerError;

/// Owned, type-erased watch source handed from a handler to the supervisor.
pub type WatchRef = Box<dyn WatchSource>;

/// # Change-notification producer with a release operation.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio::sync::mpsc;
/// use watchvisor::{WatchSource, WorkerError};
///
/// struct Ticks(mpsc::Receiver<()>);
///
/// #[async_trait]
/// impl WatchSource for Ticks {
///     async fn changed(&mut self) -> Option<()> {
///         self.0.recv().await
///     }
///
///     async fn release(&mut self) -> Result<(), WorkerError> {
///         self.0.close();
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait WatchSource: Send + 'static {
    /// Resolves once per change notification.
    ///
    /// Resolves to `None` once the producing side has stopped; the supervisor then
    /// asks [`err`](WatchSource::err) why. Must be **cancel-safe**: the control loop
    /// races it against shutdown and drops it when shutdown wins.
    async fn changed(&mut self) -> Option<()>;

    /// Reports why the source stopped producing, if it knows.
    fn err(&self) -> Option<WorkerError> {
        None
    }

    /// Stops the source and frees its resources.
    ///
    /// Called exactly once by the supervisor, even after the producing side failed.
    async fn release(&mut self) -> Result<(), WorkerError>;
}
