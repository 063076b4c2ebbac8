//! # Example: notify_worker
//!
//! Minimal watch worker: a handler that re-reads a "logging config" each time its
//! channel-backed watch source fires.
//!
//! Demonstrates how to:
//! - Implement [`WorkHandler`] over a [`ChannelSource`].
//! - Start it under a [`Supervisor`] and feed it changes through a [`Notifier`].
//! - Stop it cleanly and inspect the terminal result.
//!
//! ## Flow
//! ```text
//! Supervisor::new(handler)
//!     ├─► set_up()          → ChannelSource adopted
//!     ├─► notify() x3       → handle() per (coalesced) change
//!     ├─► stop()            → kill + wait
//!     │     ├─► release()
//!     │     └─► tear_down()
//!     └─► Ok(())
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example notify_worker
//! ```

use std::time::Duration;

use async_trait::async_trait;
use watchvisor::{ChannelSource, SetUpError, Supervisor, WatchRef, WorkHandler, WorkerError};

struct LoggingConfigWatcher {
    source: Option<ChannelSource>,
    level: u32,
}

#[async_trait]
impl WorkHandler for LoggingConfigWatcher {
    async fn set_up(&mut self) -> Result<Option<WatchRef>, SetUpError> {
        println!("[logger] set up");
        Ok(self.source.take().map(|s| Box::new(s) as WatchRef))
    }

    async fn tear_down(&mut self) {
        println!("[logger] tear down (last level={})", self.level);
    }

    async fn handle(&mut self) -> Result<(), WorkerError> {
        self.level += 1;
        println!("[logger] config changed, level={}", self.level);
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Channel-backed watch source and its producing side
    let (notifier, source) = ChannelSource::new();

    // 2. Start the worker (control loop spawns immediately)
    let worker = Supervisor::new(LoggingConfigWatcher {
        source: Some(source),
        level: 0,
    });

    // 3. Feed a few changes
    for _ in 0..3 {
        notifier.notify();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // 4. Kill + wait
    worker.stop().await?;
    println!("[main] {worker} stopped cleanly");
    Ok(())
}
