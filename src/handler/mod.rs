//! # Handler and watch source capabilities.
//!
//! This module provides the contracts a watch worker is built from:
//! - [`WorkHandler`] - set up / handle / tear down business logic
//! - [`WatchSource`] - change-notification producer with a release operation
//! - [`WatchRef`] - owned watch source (`Box<dyn WatchSource>`)
//! - [`ChannelSource`] / [`Notifier`] - in-process channel adapter

mod channel;
mod handler;
mod source;

pub use channel::{ChannelSource, Notifier};
pub use handler::WorkHandler;
pub use source::{WatchRef, WatchSource};
