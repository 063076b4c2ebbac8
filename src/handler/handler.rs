//! # Business logic plugged into a watch worker.
//!
//! A [`WorkHandler`] creates the watch source the worker waits on, reacts to each
//! change notification, and cleans up its own resources when the worker ends.
//!
//! Every long-running agent process (log-config watcher, upgrader, unit watcher...)
//! is a different handler plugged into the same [`Supervisor`](crate::Supervisor).

use async_trait::async_trait;

use crate::error::{SetUpError, WorkerError};
use crate::handler::source::WatchRef;

/// # Set-up / handle / tear-down contract.
///
/// The supervisor owns the handler exclusively and calls it only from its control
/// loop, so methods take `&mut self` and never run concurrently.
///
/// ## Call order
/// ```text
/// set_up ──► handle* ──► (watch source released) ──► tear_down
/// ```
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use watchvisor::{ChannelSource, SetUpError, WatchRef, WorkHandler, WorkerError};
///
/// struct Counter {
///     source: Option<ChannelSource>,
///     seen: u64,
/// }
///
/// #[async_trait]
/// impl WorkHandler for Counter {
///     async fn set_up(&mut self) -> Result<Option<WatchRef>, SetUpError> {
///         Ok(self.source.take().map(|s| Box::new(s) as WatchRef))
///     }
///
///     async fn tear_down(&mut self) {}
///
///     async fn handle(&mut self) -> Result<(), WorkerError> {
///         self.seen += 1;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait WorkHandler: Send + 'static {
    /// Starts the handler and creates the watch source to wait on.
    ///
    /// - `Ok(Some(source))`: the supervisor adopts `source`.
    /// - `Ok(None)`: contract violation, the worker dies with
    ///   [`WorkerError::NoWatchSource`].
    /// - `Err(e)`: the worker dies with `e.error`; if `e.watch` is set the
    ///   supervisor releases it first.
    ///
    /// Called exactly once per worker.
    async fn set_up(&mut self) -> Result<Option<WatchRef>, SetUpError>;

    /// Best-effort cleanup of handler-owned resources.
    ///
    /// Always runs exactly once, as the last step of the control loop, after the
    /// watch source (if any) has been released.
    async fn tear_down(&mut self);

    /// Reacts to one change notification.
    ///
    /// An error is fatal for the worker; there is no retry.
    async fn handle(&mut self) -> Result<(), WorkerError>;
}
