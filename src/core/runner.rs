//! # Control loop of a single watch worker.
//!
//! Runs exactly once per [`Supervisor`](crate::Supervisor), on its own tokio task:
//! set up, wait/handle, release, tear down, latch.
//!
//! ## Flow
//! ```text
//! run_worker()
//!   ├─► drive()                       (panics contained)
//!   │     ├─► handler.set_up()
//!   │     │     ├─ Ok(Some(w)) ──► adopt w, publish SetUpCompleted
//!   │     │     ├─ Ok(None)    ──► Err(NoWatchSource)
//!   │     │     └─ Err(e)      ──► release e.watch (result ignored), Err(e.error)
//!   │     └─► loop select! (biased)
//!   │           ├─ dying        ──► publish KillRequested, Ok(())
//!   │           ├─ changed Some ──► handler.handle() ─ Err ─► Err(e)
//!   │           └─ changed None ──► Err(w.err() or WatchClosed)
//!   ├─► latch drive error (first genuine error wins)
//!   ├─► release adopted watch source ─ Err ─► latch (loses to an earlier genuine error)
//!   ├─► handler.tear_down()
//!   └─► recorder.finish() ──► publish WorkerDead
//! ```
//!
//! ## Rules
//! - Release **always** precedes tear down; both run on every exit path, panics included.
//! - A pending shutdown request beats a pending change notification.
//! - `kill()` never interrupts an in-flight `handle()`; it is seen at the next wait.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::select;

use crate::{
    core::recorder::DeathRecorder,
    error::{SetUpError, WorkerError},
    events::{Bus, Event, EventKind},
    handler::{WatchRef, WorkHandler},
};

/// Everything the control loop shares with the observer handles.
pub(crate) struct LoopContext {
    pub(crate) name: Arc<str>,
    pub(crate) recorder: Arc<DeathRecorder>,
    pub(crate) bus: Bus,
}

impl LoopContext {
    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_worker(Arc::clone(&self.name))
    }

    fn publish(&self, kind: EventKind) {
        self.bus.publish(self.event(kind));
    }

    fn publish_error(&self, kind: EventKind, err: &WorkerError) {
        self.bus.publish(self.event(kind).with_reason(err.to_string()));
    }
}

/// Runs the whole worker lifetime and latches its terminal result.
pub(crate) async fn run_worker<H: WorkHandler>(mut handler: H, ctx: LoopContext) {
    let mut watch: Option<WatchRef> = None;

    if let Err(err) = guarded(drive(&mut handler, &mut watch, &ctx))
        .await
        .and_then(|res| res)
    {
        ctx.recorder.kill(Some(err));
    }

    if let Some(mut source) = watch.take() {
        match guarded(source.release()).await.and_then(|res| res) {
            Ok(()) => ctx.publish(EventKind::Released),
            Err(err) => {
                ctx.publish_error(EventKind::ReleaseFailed, &err);
                ctx.recorder.kill(Some(err));
            }
        }
    }

    if let Err(err) = guarded(handler.tear_down()).await {
        ctx.recorder.kill(Some(err));
    }
    ctx.publish(EventKind::TornDown);

    let dead = match ctx.recorder.finish() {
        Ok(()) => ctx.event(EventKind::WorkerDead),
        Err(err) => ctx.event(EventKind::WorkerDead).with_reason(err.to_string()),
    };
    ctx.bus.publish(dead);
}

/// Set up, then wait for shutdown or changes until one of them ends the loop.
///
/// An adopted watch source is parked in `slot` so the caller can release it
/// whatever way this future ends.
async fn drive<H: WorkHandler>(
    handler: &mut H,
    slot: &mut Option<WatchRef>,
    ctx: &LoopContext,
) -> Result<(), WorkerError> {
    let source = match handler.set_up().await {
        Ok(Some(source)) => slot.insert(source),
        Ok(None) => {
            let err = WorkerError::NoWatchSource;
            ctx.publish_error(EventKind::SetUpFailed, &err);
            return Err(err);
        }
        Err(SetUpError { error, watch }) => {
            ctx.publish_error(EventKind::SetUpFailed, &error);
            if let Some(mut source) = watch {
                // The set up error already explains the failure.
                let _ = guarded(source.release()).await;
            }
            return Err(error);
        }
    };
    ctx.publish(EventKind::SetUpCompleted);

    let mut handled: u64 = 0;
    loop {
        select! {
            biased;
            _ = ctx.recorder.dying() => {
                ctx.publish(EventKind::KillRequested);
                return Ok(());
            }
            change = source.changed() => match change {
                Some(()) => {
                    if let Err(err) = handler.handle().await {
                        ctx.bus.publish(
                            ctx.event(EventKind::HandleFailed)
                                .with_handled(handled)
                                .with_reason(err.to_string()),
                        );
                        return Err(err);
                    }
                    handled += 1;
                    ctx.bus
                        .publish(ctx.event(EventKind::ChangeHandled).with_handled(handled));
                }
                None => {
                    let err = source.err().unwrap_or(WorkerError::WatchClosed);
                    ctx.publish_error(EventKind::WatchClosed, &err);
                    return Err(err);
                }
            },
        }
    }
}

/// Awaits `fut`, turning a panic into [`WorkerError::Panicked`].
async fn guarded<F: Future>(fut: F) -> Result<F::Output, WorkerError> {
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .map_err(WorkerError::from_panic)
}
