//! # Example: observed_worker
//!
//! A worker whose handler fails on the second change, observed through the
//! built-in [`LogWriter`] subscriber.
//!
//! ## Example output
//! ```text
//! [set-up] worker="upgrader"
//! [handled] worker="upgrader" count=Some(1)
//! [handle-failed] worker="upgrader" err=Some("permission denied") after=Some(1)
//! [released] worker="upgrader"
//! [torn-down] worker="upgrader"
//! [dead] worker="upgrader" err=Some("permission denied")
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example observed_worker --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use watchvisor::{
    ChannelSource, LogWriter, SetUpError, Subscribe, Supervisor, WatchRef, WorkHandler,
    WorkerConfig, WorkerError,
};

struct Upgrader {
    source: Option<ChannelSource>,
    checks: u32,
}

#[async_trait]
impl WorkHandler for Upgrader {
    async fn set_up(&mut self) -> Result<Option<WatchRef>, SetUpError> {
        Ok(self.source.take().map(|s| Box::new(s) as WatchRef))
    }

    async fn tear_down(&mut self) {}

    async fn handle(&mut self) -> Result<(), WorkerError> {
        self.checks += 1;
        if self.checks > 1 {
            return Err(WorkerError::fail("permission denied"));
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let (notifier, source) = ChannelSource::new();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    let worker = Supervisor::builder(Upgrader {
        source: Some(source),
        checks: 0,
    })
    .with_config(WorkerConfig::named("upgrader"))
    .with_subscribers(subs)
    .spawn();

    notifier.notify();
    tokio::time::sleep(Duration::from_millis(50)).await;
    notifier.notify();

    match worker.wait().await {
        Ok(()) => println!("[main] {worker} stopped cleanly"),
        Err(e) => println!("[main] {worker} died: {} ({})", e, e.as_label()),
    }

    // Give the subscriber worker a moment to flush the last lines.
    tokio::time::sleep(Duration::from_millis(50)).await;
}
