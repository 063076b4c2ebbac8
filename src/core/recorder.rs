//! # DeathRecorder: one-shot terminal state latch.
//!
//! The only state shared between the control loop and observer handles.
//!
//! ## State machine
//! ```text
//!            kill(None)                    finish()
//!   Alive ─────────────► Dying(None) ───────────────► Dead(Ok)
//!     │                     │ kill(Some(e))
//!     │ kill(Some(e))       ▼                finish()
//!     └──────────────► Dying(Some(e)) ──────────────► Dead(Err(e))
//! ```
//!
//! ## Rules
//! - `Dying(None)` is the clean-shutdown sentinel; any later genuine error replaces it.
//! - A genuine error is never replaced or cleared once latched.
//! - `finish()` fixes the terminal value exactly once and wakes every waiter.
//! - The dying signal is a [`CancellationToken`]; the dead signal is a
//!   [`tokio::sync::watch`] channel, so waiters never poll.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::error::WorkerError;

/// Terminal result of a worker.
pub(crate) type Outcome = Result<(), WorkerError>;

enum Life {
    Alive,
    Dying(Option<WorkerError>),
    Dead,
}

pub(crate) struct DeathRecorder {
    life: Mutex<Life>,
    dying: CancellationToken,
    dead: watch::Sender<Option<Outcome>>,
}

impl DeathRecorder {
    pub(crate) fn new() -> Self {
        let (dead, _rx) = watch::channel(None);
        Self {
            life: Mutex::new(Life::Alive),
            dying: CancellationToken::new(),
            dead,
        }
    }

    /// Requests shutdown, optionally latching a genuine error.
    ///
    /// Returns `true` only for the call that moved the recorder out of `Alive`.
    pub(crate) fn kill(&self, reason: Option<WorkerError>) -> bool {
        let first = {
            let mut life = self.life.lock().unwrap_or_else(PoisonError::into_inner);
            match *life {
                Life::Alive => {
                    *life = Life::Dying(reason);
                    true
                }
                Life::Dying(ref mut latched) => {
                    if latched.is_none() {
                        *latched = reason;
                    }
                    false
                }
                Life::Dead => false,
            }
        };
        self.dying.cancel();
        first
    }

    /// Resolves once shutdown has been requested (or an error latched).
    pub(crate) fn dying(&self) -> WaitForCancellationFuture<'_> {
        self.dying.cancelled()
    }

    pub(crate) fn is_dying(&self) -> bool {
        self.dying.is_cancelled()
    }

    /// Fixes the terminal value and wakes every waiter.
    ///
    /// Calling it again returns the already fixed value.
    pub(crate) fn finish(&self) -> Outcome {
        let outcome = {
            let mut life = self.life.lock().unwrap_or_else(PoisonError::into_inner);
            match std::mem::replace(&mut *life, Life::Dead) {
                Life::Alive | Life::Dying(None) => Ok(()),
                Life::Dying(Some(err)) => Err(err),
                Life::Dead => return self.outcome().unwrap_or(Ok(())),
            }
        };
        self.dying.cancel();
        self.dead.send_replace(Some(outcome.clone()));
        outcome
    }

    /// The terminal value, if the recorder is dead.
    pub(crate) fn outcome(&self) -> Option<Outcome> {
        self.dead.borrow().clone()
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.dead.borrow().is_some()
    }

    /// Waits until the recorder is dead and returns the terminal value.
    pub(crate) async fn wait(&self) -> Outcome {
        let mut rx = self.dead.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(Option::is_some).await;
        self.outcome().unwrap_or(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn boom(msg: &str) -> WorkerError {
        WorkerError::fail(msg)
    }

    #[test]
    fn clean_kill_finishes_ok() {
        let rec = DeathRecorder::new();
        assert!(!rec.is_dying());
        assert!(rec.kill(None));
        assert!(rec.is_dying());
        assert!(!rec.is_dead());

        assert_eq!(rec.finish(), Ok(()));
        assert!(rec.is_dead());
    }

    #[test]
    fn only_the_first_kill_reports_transition() {
        let rec = DeathRecorder::new();
        assert!(rec.kill(None));
        assert!(!rec.kill(None));
        assert!(!rec.kill(Some(boom("late"))));
    }

    #[test]
    fn sentinel_is_upgraded_by_a_genuine_error() {
        let rec = DeathRecorder::new();
        rec.kill(None);
        rec.kill(Some(boom("release failed")));
        assert_eq!(rec.finish(), Err(boom("release failed")));
    }

    #[test]
    fn first_genuine_error_wins() {
        let rec = DeathRecorder::new();
        rec.kill(Some(boom("handle failed")));
        rec.kill(Some(boom("release failed")));
        rec.kill(None);
        assert_eq!(rec.finish(), Err(boom("handle failed")));
    }

    #[test]
    fn finish_is_idempotent_and_kill_after_death_is_ignored() {
        let rec = DeathRecorder::new();
        rec.kill(Some(boom("first")));
        assert_eq!(rec.finish(), Err(boom("first")));

        assert!(!rec.kill(Some(boom("second"))));
        assert_eq!(rec.finish(), Err(boom("first")));
        assert_eq!(rec.outcome(), Some(Err(boom("first"))));
    }

    #[test]
    fn finish_without_kill_is_clean() {
        let rec = DeathRecorder::new();
        assert_eq!(rec.finish(), Ok(()));
        assert!(rec.is_dying());
    }

    #[tokio::test]
    async fn dying_resolves_after_kill() {
        let rec = Arc::new(DeathRecorder::new());
        let r = Arc::clone(&rec);
        let waiter = tokio::spawn(async move { r.dying().await });

        rec.kill(None);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("dying should resolve")
            .expect("join");
    }

    #[tokio::test]
    async fn every_waiter_sees_the_same_outcome() {
        let rec = Arc::new(DeathRecorder::new());
        let mut waiters = Vec::new();
        for _ in 0..8 {
            let r = Arc::clone(&rec);
            waiters.push(tokio::spawn(async move { r.wait().await }));
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        for w in &waiters {
            assert!(!w.is_finished(), "wait returned before death");
        }

        rec.kill(Some(boom("boom")));
        let _ = rec.finish();

        for w in waiters {
            let outcome = tokio::time::timeout(Duration::from_secs(1), w)
                .await
                .expect("waiter should wake")
                .expect("join");
            assert_eq!(outcome, Err(boom("boom")));
        }

        // Late waiters return immediately.
        assert_eq!(rec.wait().await, Err(boom("boom")));
    }
}
