#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};
use watchvisor::{SetUpError, Supervisor, WatchRef, WatchSource, WorkHandler, WorkerError};

/// Long enough for anything that should happen; a timeout means the test is stuck.
pub const LONG_WAIT: Duration = Duration::from_secs(5);
/// How long to watch for something that should *not* happen.
pub const SHORT_WAIT: Duration = Duration::from_millis(50);

/// Ordered record of handler and watch source calls.
///
/// The handler writes `setup`, `handler`, `teardown`; the watch source writes `release`.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<&'static str>>>);

impl Log {
    fn push(&self, entry: &'static str) {
        self.0.lock().unwrap().push(entry);
    }

    /// Handler calls only.
    pub fn actions(&self) -> Vec<&'static str> {
        self.trace().into_iter().filter(|e| *e != "release").collect()
    }

    /// Handler and watch source calls, interleaved.
    pub fn trace(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct WatchState {
    released: AtomicBool,
    release_panics: AtomicBool,
    release_error: Mutex<Option<WorkerError>>,
}

/// Watch source driven by the test through a [`WatchControl`].
pub struct TestWatch {
    rx: mpsc::Receiver<()>,
    state: Arc<WatchState>,
    log: Log,
}

#[async_trait]
impl WatchSource for TestWatch {
    async fn changed(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    async fn release(&mut self) -> Result<(), WorkerError> {
        self.log.push("release");
        self.state.released.store(true, Ordering::SeqCst);
        if self.state.release_panics.load(Ordering::SeqCst) {
            panic!("release exploded");
        }
        match self.state.release_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Test-side handle of a [`TestWatch`].
pub struct WatchControl {
    tx: mpsc::Sender<()>,
    state: Arc<WatchState>,
}

impl WatchControl {
    pub async fn trigger_change(&self) {
        within(LONG_WAIT, "triggering change", self.tx.send(()))
            .await
            .expect("watch source dropped before the change was sent");
    }

    pub fn set_release_error(&self, err: WorkerError) {
        *self.state.release_error.lock().unwrap() = Some(err);
    }

    pub fn panic_on_release(&self) {
        self.state.release_panics.store(true, Ordering::SeqCst);
    }

    pub fn released(&self) -> bool {
        self.state.released.load(Ordering::SeqCst)
    }
}

/// Handler that records every call and can be told to fail.
pub struct ActionsHandler {
    log: Log,
    handled: mpsc::UnboundedSender<()>,
    watch: Option<TestWatch>,
    setup_error: Option<WorkerError>,
    handler_error: Option<WorkerError>,
    panic_in_handle: bool,
    panic_in_set_up: bool,
    panic_in_tear_down: bool,
    setup_delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
}

impl ActionsHandler {
    pub fn with_setup_error(mut self, err: WorkerError) -> Self {
        self.setup_error = Some(err);
        self
    }

    pub fn with_handler_error(mut self, err: WorkerError) -> Self {
        self.handler_error = Some(err);
        self
    }

    pub fn without_watch(mut self) -> Self {
        self.watch = None;
        self
    }

    pub fn panicking_in_handle(mut self) -> Self {
        self.panic_in_handle = true;
        self
    }

    pub fn panicking_in_set_up(mut self) -> Self {
        self.panic_in_set_up = true;
        self
    }

    pub fn panicking_in_tear_down(mut self) -> Self {
        self.panic_in_tear_down = true;
        self
    }

    /// Every `handle()` call parks until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_setup_delay(mut self, delay: Duration) -> Self {
        self.setup_delay = Some(delay);
        self
    }
}

#[async_trait]
impl WorkHandler for ActionsHandler {
    async fn set_up(&mut self) -> Result<Option<WatchRef>, SetUpError> {
        if let Some(delay) = self.setup_delay {
            tokio::time::sleep(delay).await;
        }
        self.log.push("setup");
        if self.panic_in_set_up {
            panic!("set up exploded");
        }
        let watch = self.watch.take().map(|w| Box::new(w) as WatchRef);
        match self.setup_error.clone() {
            Some(error) => Err(SetUpError { error, watch }),
            None => Ok(watch),
        }
    }

    async fn tear_down(&mut self) {
        self.log.push("teardown");
        if self.panic_in_tear_down {
            panic!("tear down exploded");
        }
    }

    async fn handle(&mut self) -> Result<(), WorkerError> {
        self.log.push("handler");
        let _ = self.handled.send(());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.panic_in_handle {
            panic!("handler exploded");
        }
        match self.handler_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Everything a test needs to drive and inspect one worker.
pub struct Fixture {
    pub handler: ActionsHandler,
    pub log: Log,
    pub watch: WatchControl,
    pub handled: mpsc::UnboundedReceiver<()>,
}

pub fn fixture() -> Fixture {
    let log = Log::default();
    let (tx, rx) = mpsc::channel(1);
    let state = Arc::new(WatchState::default());
    let (handled_tx, handled_rx) = mpsc::unbounded_channel();

    let handler = ActionsHandler {
        log: log.clone(),
        handled: handled_tx,
        watch: Some(TestWatch {
            rx,
            state: Arc::clone(&state),
            log: log.clone(),
        }),
        setup_error: None,
        handler_error: None,
        panic_in_handle: false,
        panic_in_set_up: false,
        panic_in_tear_down: false,
        setup_delay: None,
        gate: None,
    };

    Fixture {
        handler,
        log,
        watch: WatchControl { tx, state },
        handled: handled_rx,
    }
}

/// Awaits `fut`, failing the test if it takes longer than `limit`.
pub async fn within<F: Future>(limit: Duration, what: &str, fut: F) -> F::Output {
    match tokio::time::timeout(limit, fut).await {
        Ok(out) => out,
        Err(_) => panic!("timed out after {limit:?} {what}"),
    }
}

pub async fn wait_for_handled(handled: &mut mpsc::UnboundedReceiver<()>) {
    within(LONG_WAIT, "waiting for handle()", handled.recv())
        .await
        .expect("handler dropped");
}

/// `wait()` that fails the test instead of hanging the suite.
pub async fn wait_long(worker: &Supervisor) -> Result<(), WorkerError> {
    within(LONG_WAIT, "waiting for the worker to die", worker.wait()).await
}
