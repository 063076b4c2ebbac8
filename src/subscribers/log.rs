//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos; implement a custom [`Subscribe`] for structured logging.
//!
//! ## Example output
//! ```text
//! [set-up] worker="logger"
//! [handled] worker="logger" count=Some(1)
//! [kill-requested] worker="logger"
//! [released] worker="logger"
//! [torn-down] worker="logger"
//! [dead] worker="logger" err=None
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let worker = e.worker.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::SetUpCompleted => println!("[set-up] worker={worker:?}"),
            EventKind::SetUpFailed => {
                println!("[set-up-failed] worker={worker:?} err={:?}", e.reason);
            }
            EventKind::KillRequested => println!("[kill-requested] worker={worker:?}"),
            EventKind::ChangeHandled => {
                println!("[handled] worker={worker:?} count={:?}", e.handled);
            }
            EventKind::HandleFailed => {
                println!(
                    "[handle-failed] worker={worker:?} err={:?} after={:?}",
                    e.reason, e.handled
                );
            }
            EventKind::WatchClosed => {
                println!("[watch-closed] worker={worker:?} err={:?}", e.reason);
            }
            EventKind::Released => println!("[released] worker={worker:?}"),
            EventKind::ReleaseFailed => {
                println!("[release-failed] worker={worker:?} err={:?}", e.reason);
            }
            EventKind::TornDown => println!("[torn-down] worker={worker:?}"),
            EventKind::WorkerDead => println!("[dead] worker={worker:?} err={:?}", e.reason),
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] subscriber={worker} reason={:?}", e.reason);
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={worker} info={}",
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
