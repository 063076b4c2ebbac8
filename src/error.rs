//! Error types used by watch workers and their handlers.
//!
//! - [`WorkerError`] — the terminal reason a worker reports from `wait()`/`stop()`.
//! - [`SetUpError`] — what a handler's `set_up` returns on failure, optionally
//!   carrying a watch source that still has to be released.
//!
//! [`WorkerError`] provides helper methods (`as_label`, `as_message`) for logging/metrics.

use std::fmt;

use thiserror::Error;

use crate::handler::WatchRef;

/// # Errors produced by a watch worker.
///
/// Every variant is terminal for the worker that latched it. The type is `Clone`
/// because every `wait()` caller receives its own copy of the same terminal value.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Failure reported by a handler or a watch source.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The handler's `set_up` returned neither a watch source nor an error.
    #[error("set up returned no watch source")]
    NoWatchSource,

    /// The watch source stopped producing notifications without reporting why.
    #[error("watch source closed unexpectedly")]
    WatchClosed,

    /// A handler or watch source call panicked.
    #[error("panicked: {error}")]
    Panicked {
        /// Panic payload, if it was a string.
        error: String,
    },
}

impl WorkerError {
    /// Shorthand for [`WorkerError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use watchvisor::WorkerError;
    ///
    /// let err = WorkerError::fail("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn fail(error: impl fmt::Display) -> Self {
        WorkerError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use watchvisor::WorkerError;
    ///
    /// assert_eq!(WorkerError::NoWatchSource.as_label(), "worker_no_watch_source");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::NoWatchSource => "worker_no_watch_source",
            WorkerError::WatchClosed => "worker_watch_closed",
            WorkerError::Panicked { .. } => "worker_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkerError::Fail { error } => format!("error: {error}"),
            WorkerError::NoWatchSource => {
                "contract violation: set up returned no watch source".to_string()
            }
            WorkerError::WatchClosed => "watch source closed without an error".to_string(),
            WorkerError::Panicked { error } => format!("panic: {error}"),
        }
    }

    /// Builds a [`WorkerError::Panicked`] from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let error = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        WorkerError::Panicked { error }
    }
}

/// # Failure returned by [`WorkHandler::set_up`](crate::WorkHandler::set_up).
///
/// A handler may fail after it already created its watch source. In that case it
/// hands the source back through [`SetUpError::with_watch`] and the supervisor
/// releases it. The release result is ignored because `error` already explains
/// the failure.
pub struct SetUpError {
    /// Why set up failed.
    pub error: WorkerError,
    /// A watch source created before the failure, still owed a release.
    pub watch: Option<WatchRef>,
}

impl SetUpError {
    /// A failure with no watch source to release.
    pub fn new(error: WorkerError) -> Self {
        Self { error, watch: None }
    }

    /// A failure that still hands over a watch source for release.
    pub fn with_watch(error: WorkerError, watch: WatchRef) -> Self {
        Self {
            error,
            watch: Some(watch),
        }
    }
}

impl From<WorkerError> for SetUpError {
    fn from(error: WorkerError) -> Self {
        Self::new(error)
    }
}

impl fmt::Debug for SetUpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetUpError")
            .field("error", &self.error)
            .field("watch", &self.watch.is_some())
            .finish()
    }
}

impl fmt::Display for SetUpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for SetUpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
