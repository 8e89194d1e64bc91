//! Engine facade — owns the fire queue and wires the command layer's
//! triggers to it. One instance per process.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use kountdown_core::error::Result;
use kountdown_core::traits::{Dispatcher, EventStore, SubscriberStore};
use kountdown_core::types::Event;

use crate::poller::Poller;
use crate::queue::FireQueue;

pub struct Engine {
    queue: Arc<FireQueue>,
    events: Arc<dyn EventStore>,
    subscribers: Arc<dyn SubscriberStore>,
}

impl Engine {
    pub fn new(events: Arc<dyn EventStore>, subscribers: Arc<dyn SubscriberStore>) -> Self {
        Self {
            queue: Arc::new(FireQueue::new()),
            events,
            subscribers,
        }
    }

    pub fn queue(&self) -> &Arc<FireQueue> {
        &self.queue
    }

    /// Rebuild the queue from every stored event. Called once at startup,
    /// before the poller begins ticking.
    pub async fn on_startup(&self) -> Result<()> {
        let events = self.events.list().await?;
        self.queue.rebuild_all(&events, Utc::now());
        tracing::info!(
            "schedule initialized: {} events, {} pending reminders",
            events.len(),
            self.queue.len()
        );
        Ok(())
    }

    /// A new event exists; schedule its reminders.
    pub fn on_event_created(&self, event: &Event) {
        self.queue.rebuild_for_event(event, Utc::now());
    }

    /// An event's target time changed; recompute its reminders from scratch.
    pub fn on_event_time_changed(&self, event: &Event) {
        self.queue.rebuild_for_event(event, Utc::now());
    }

    /// Spawn the background poller. Returns the handle used to stop it.
    pub fn start_poller(
        &self,
        dispatcher: Arc<dyn Dispatcher>,
        interval: Duration,
    ) -> (Arc<Poller>, tokio::task::JoinHandle<()>) {
        let poller = Arc::new(Poller::new(
            self.queue.clone(),
            self.events.clone(),
            self.subscribers.clone(),
            dispatcher,
            interval,
        ));
        let handle = poller.clone().spawn();
        (poller, handle)
    }
}
