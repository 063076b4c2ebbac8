//! # watchvisor
//!
//! **Watchvisor** runs long-lived background workers driven by a change-notification
//! source, with ordered set-up/tear-down around the activity and exactly one terminal
//! failure reason.
//!
//! Every long-running agent process (log-config watcher, upgrader, unit watcher...)
//! is the same supervision skeleton with a different [`WorkHandler`] plugged in.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐          ┌──────────────┐
//!     │ WorkHandler  │ set_up() │ WatchSource  │
//!     │ (app logic)  ├─────────►│ (changes)    │
//!     └──────┬───────┘          └──────┬───────┘
//!            │ owned by                │ owned by (after set_up)
//!            ▼                         ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  control loop (one tokio task per Supervisor)                     │
//! │  set_up ─► { select!(dying, changed) ─► handle }* ─► release ─►   │
//! │  tear_down ─► latch terminal reason                               │
//! └──────┬───────────────────────────────────────────┬────────────────┘
//!        │ publish(Event)                            │ finish()
//!        ▼                                           ▼
//! ┌──────────────┐                          ┌──────────────────┐
//! │ Bus          │──► SubscriberSet         │ DeathRecorder    │◄── kill() / wait()
//! │ (broadcast)  │    (LogWriter, custom)   │ alive→dying→dead │    from any Supervisor clone
//! └──────────────┘                          └──────────────────┘
//! ```
//!
//! ### Terminal reason precedence
//! - Clean `kill()` → `Ok(())`.
//! - The first genuine failure (set up, handle, watch source, panic) wins.
//! - A watch source release failure replaces a clean shutdown, never an earlier failure.
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                       |
//! |-------------------|----------------------------------------------------------|------------------------------------------|
//! | **Supervision**   | Run one handler under a control loop with kill/wait/stop. | [`Supervisor`], [`Worker`]              |
//! | **Capabilities**  | Business logic and change sources.                        | [`WorkHandler`], [`WatchSource`]        |
//! | **Adapters**      | In-process, coalescing change source.                     | [`ChannelSource`], [`Notifier`]         |
//! | **Subscriber API**| Hook into worker lifecycle events.                        | [`Subscribe`], [`Event`]                |
//! | **Errors**        | Typed terminal reasons.                                   | [`WorkerError`], [`SetUpError`]         |
//! | **Configuration** | Per-worker settings.                                      | [`WorkerConfig`]                        |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use watchvisor::{
//!     ChannelSource, SetUpError, Supervisor, WatchRef, WorkHandler, WorkerConfig, WorkerError,
//! };
//!
//! struct LoggingConfig {
//!     source: Option<ChannelSource>,
//!     reloads: u32,
//! }
//!
//! #[async_trait]
//! impl WorkHandler for LoggingConfig {
//!     async fn set_up(&mut self) -> Result<Option<WatchRef>, SetUpError> {
//!         Ok(self.source.take().map(|s| Box::new(s) as WatchRef))
//!     }
//!
//!     async fn tear_down(&mut self) {}
//!
//!     async fn handle(&mut self) -> Result<(), WorkerError> {
//!         self.reloads += 1;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), WorkerError> {
//!     let (notifier, source) = ChannelSource::new();
//!     let worker = Supervisor::builder(LoggingConfig { source: Some(source), reloads: 0 })
//!         .with_config(WorkerConfig::named("logger"))
//!         .spawn();
//!
//!     notifier.notify();
//!     assert_eq!(worker.to_string(), r#"watch worker "logger""#);
//!     worker.stop().await
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod handler;
mod subscribers;
mod worker;

// ---- Public re-exports ----

pub use config::WorkerConfig;
pub use crate::core::{Supervisor, SupervisorBuilder};
pub use error::{SetUpError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use handler::{ChannelSource, Notifier, WatchRef, WatchSource, WorkHandler};
pub use subscribers::{Subscribe, SubscriberSet};
pub use worker::Worker;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
