//! Runtime core: the supervised control loop and its lifecycle.
//!
//! The only public API from this module is [`Supervisor`] and its
//! [`SupervisorBuilder`].
//!
//! Internal modules:
//! - [`recorder`]: one-shot terminal state latch shared with observers;
//! - [`runner`]: the control loop (set up, wait/handle, release, tear down);
//! - [`supervisor`]: observer handle (`kill`, `wait`, `stop`);
//! - [`builder`]: wires config, event bus and subscribers, then spawns the loop.

mod builder;
mod recorder;
mod runner;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use supervisor::Supervisor;
