use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use super::{
    recorder::DeathRecorder,
    runner::{LoopContext, run_worker},
    supervisor::Supervisor,
};
use crate::{
    config::WorkerConfig,
    events::Bus,
    handler::WorkHandler,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for starting a [`Supervisor`] with optional configuration and subscribers.
pub struct SupervisorBuilder<H> {
    handler: H,
    cfg: WorkerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<H: WorkHandler> SupervisorBuilder<H> {
    /// Creates a new builder with default configuration.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            cfg: WorkerConfig::default(),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the worker configuration.
    pub fn with_config(mut self, cfg: WorkerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers are attached before the control loop starts, so they see every
    /// event of the worker's lifetime, ending with `WorkerDead`.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Spawns the control loop and returns its handle.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(self) -> Supervisor {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        if !self.subscribers.is_empty() {
            subscriber_listener(&bus, self.subscribers);
        }

        let name: Arc<str> = Arc::from(&*self.cfg.name);
        let recorder = Arc::new(DeathRecorder::new());
        let ctx = LoopContext {
            name: Arc::clone(&name),
            recorder: Arc::clone(&recorder),
            bus: bus.clone(),
        };
        tokio::spawn(run_worker(self.handler, ctx));

        Supervisor::from_parts(name, recorder, bus)
    }
}

/// Forwards bus events to the subscriber set until the worker's terminal event.
fn subscriber_listener(bus: &Bus, subscribers: Vec<Arc<dyn Subscribe>>) {
    let mut rx = bus.subscribe();
    let set = SubscriberSet::new(subscribers, bus.clone());
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    set.emit(&ev);
                    if ev.is_terminal() {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });
}
