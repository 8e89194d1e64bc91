//! Collaborator traits the scheduling core depends on.
//!
//! The core never touches sqlite or the network directly; it talks to events,
//! subscribers, and delivery through these seams so tests can swap in fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{Event, Subscriber};

/// Durable CRUD for countdown events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event and return it with its assigned id.
    async fn add(
        &self,
        name: &str,
        description: &str,
        target_time: DateTime<Utc>,
    ) -> Result<Event>;

    /// Look up one event. `Ok(None)` when no such id exists — a deleted
    /// event's stale queue entries resolve to this, not to an error.
    async fn get(&self, id: i64) -> Result<Option<Event>>;

    /// All stored events, unfiltered. Callers filter by target time.
    async fn list(&self) -> Result<Vec<Event>>;

    async fn update(&self, event: &Event) -> Result<()>;

    async fn remove(&self, id: i64) -> Result<()>;
}

/// Durable set of notification recipients.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn subscribe(&self, name: &str) -> Result<()>;

    async fn unsubscribe(&self, name: &str) -> Result<()>;

    async fn list(&self) -> Result<Vec<Subscriber>>;
}

/// Delivers one formatted message to one recipient. Best-effort: the poller
/// logs failures and moves on to the next recipient.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    fn name(&self) -> &str;

    async fn send_direct(&self, text: &str, recipient: &str) -> Result<()>;

    async fn send_channel_notice(&self, text: &str, channel: &str) -> Result<()>;
}
