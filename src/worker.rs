//! # Common interface of long-running agent workers.
//!
//! [`Worker`] is what an agent process holds for each of its background
//! activities: a way to ask it to stop and a way to learn why it stopped.
//! [`Supervisor`] implements it; composite workers can implement it too.

use async_trait::async_trait;

use crate::{core::Supervisor, error::WorkerError};

/// A killable, waitable background activity.
///
/// # Example
/// ```rust
/// use watchvisor::{Worker, WorkerError};
///
/// async fn shut_down_all(workers: &[Box<dyn Worker>]) -> Vec<WorkerError> {
///     for w in workers {
///         w.kill();
///     }
///     let mut errors = Vec::new();
///     for w in workers {
///         if let Err(e) = w.wait().await {
///             errors.push(e);
///         }
///     }
///     errors
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync {
    /// Requests shutdown without waiting for it.
    fn kill(&self);

    /// Waits for the worker to finish and returns its terminal error, if any.
    async fn wait(&self) -> Result<(), WorkerError>;

    /// Kill and wait.
    async fn stop(&self) -> Result<(), WorkerError> {
        self.kill();
        self.wait().await
    }
}

#[async_trait]
impl Worker for Supervisor {
    fn kill(&self) {
        Supervisor::kill(self);
    }

    async fn wait(&self) -> Result<(), WorkerError> {
        Supervisor::wait(self).await
    }

    async fn stop(&self) -> Result<(), WorkerError> {
        Supervisor::stop(self).await
    }
}
