//! # Supervisor: observer handle of one watch worker.
//!
//! A [`Supervisor`] owns nothing but the shared terminal-state latch and the event bus;
//! the handler and its watch source live inside the control-loop task spawned at
//! construction (see `runner`).
//!
//! ## Lifecycle
//! ```text
//! Supervisor::new(handler) ──► tokio::spawn(run_worker)      (returns immediately)
//!
//!   kill()  ──► DeathRecorder: Alive ─► Dying(sentinel)       (non-blocking, idempotent)
//!   wait()  ──► until DeathRecorder is Dead ─► terminal error (any number of callers)
//!   stop()  ──► kill() + wait()
//! ```
//!
//! ## Rules
//! - The control loop runs at most once; a dead worker never restarts.
//! - Clones share the same worker; every clone observes the same terminal value.
//! - `kill()` is a signal, not a preemption: in-flight handler calls finish first.
//! - No built-in timeout; bound `wait()` with `tokio::time::timeout` if needed.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use watchvisor::{ChannelSource, SetUpError, Supervisor, WatchRef, WorkHandler, WorkerError};
//!
//! struct Reload {
//!     source: Option<ChannelSource>,
//! }
//!
//! #[async_trait]
//! impl WorkHandler for Reload {
//!     async fn set_up(&mut self) -> Result<Option<WatchRef>, SetUpError> {
//!         Ok(self.source.take().map(|s| Box::new(s) as WatchRef))
//!     }
//!     async fn tear_down(&mut self) {}
//!     async fn handle(&mut self) -> Result<(), WorkerError> {
//!         // re-read configuration...
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), WorkerError> {
//!     let (notifier, source) = ChannelSource::new();
//!     let worker = Supervisor::new(Reload { source: Some(source) });
//!
//!     notifier.notify();
//!     worker.stop().await
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{
    core::{builder::SupervisorBuilder, recorder::DeathRecorder},
    error::WorkerError,
    events::{Bus, Event},
    handler::WorkHandler,
};

/// Handle to a running (or finished) watch worker.
///
/// Cheap to clone; all clones observe the same worker.
#[derive(Clone)]
pub struct Supervisor {
    name: Arc<str>,
    recorder: Arc<DeathRecorder>,
    bus: Bus,
}

impl Supervisor {
    /// Starts a worker around `handler` with default configuration.
    ///
    /// Spawns the control loop immediately; must be called inside a tokio runtime.
    pub fn new<H: WorkHandler>(handler: H) -> Self {
        Self::builder(handler).spawn()
    }

    /// Returns a builder to configure the worker before it starts.
    pub fn builder<H: WorkHandler>(handler: H) -> SupervisorBuilder<H> {
        SupervisorBuilder::new(handler)
    }

    pub(crate) fn from_parts(name: Arc<str>, recorder: Arc<DeathRecorder>, bus: Bus) -> Self {
        Self {
            name,
            recorder,
            bus,
        }
    }

    /// Requests shutdown without waiting for it.
    ///
    /// Safe to call any number of times, from any thread, before or after the loop ends.
    /// The control loop publishes `KillRequested` when it observes the request, so
    /// subscribers always see it before `WorkerDead`.
    pub fn kill(&self) {
        self.recorder.kill(None);
    }

    /// Waits until the worker has released its watch source and torn down.
    ///
    /// Returns `Ok(())` on a clean shutdown, otherwise the latched terminal error.
    /// Every caller receives the same value.
    pub async fn wait(&self) -> Result<(), WorkerError> {
        self.recorder.wait().await
    }

    /// [`kill`](Self::kill) followed by [`wait`](Self::wait).
    pub async fn stop(&self) -> Result<(), WorkerError> {
        self.kill();
        self.wait().await
    }

    /// Blocking [`wait`](Self::wait) for plain OS threads.
    ///
    /// Must not be called from inside an async context.
    pub fn wait_blocking(&self) -> Result<(), WorkerError> {
        futures::executor::block_on(self.wait())
    }

    /// Resolves once shutdown has been requested or a failure was latched.
    pub async fn dying(&self) {
        self.recorder.dying().await;
    }

    /// True once shutdown has been requested or a failure was latched.
    pub fn is_dying(&self) -> bool {
        self.recorder.is_dying()
    }

    /// True once the terminal value is fixed.
    pub fn is_dead(&self) -> bool {
        self.recorder.is_dead()
    }

    /// The terminal value, or `None` while the worker is still running.
    pub fn outcome(&self) -> Option<Result<(), WorkerError>> {
        self.recorder.outcome()
    }

    /// Worker name from [`WorkerConfig`](crate::WorkerConfig).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribes to this worker's events.
    ///
    /// Only events published after this call are observed; use
    /// [`SupervisorBuilder::with_subscribers`] to see the whole lifetime.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }
}

impl fmt::Display for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch worker {:?}", self.name)
    }
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("name", &self.name)
            .field("dying", &self.is_dying())
            .field("dead", &self.is_dead())
            .finish()
    }
}
