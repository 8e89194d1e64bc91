//! Domain types: events, subscribers, and scheduled fire entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A countdown event with a target time in UTC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Unique id, assigned by the store on creation.
    pub id: i64,
    pub name: String,
    pub description: String,
    pub target_time: DateTime<Utc>,
}

impl Event {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        description: impl Into<String>,
        target_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            target_time,
        }
    }
}

/// A notification recipient. Names starting with `#` denote channels,
/// anything else is a direct/user target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscriber {
    pub name: String,
}

impl Subscriber {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_channel(&self) -> bool {
        self.name.starts_with('#')
    }
}

/// One scheduled reminder: fire for `event_id` at `fire_time`.
///
/// `fire_time` is `target_time - offset` for one of the lead-time offsets.
/// The entry whose fire time equals the event's target time is the terminal
/// "event has arrived" entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FireEntry {
    pub event_id: i64,
    pub fire_time: DateTime<Utc>,
}

impl FireEntry {
    pub fn new(event_id: i64, fire_time: DateTime<Utc>) -> Self {
        Self {
            event_id,
            fire_time,
        }
    }

    /// Whether this is the event's terminal (zero-offset) entry.
    pub fn is_terminal(&self, event: &Event) -> bool {
        self.fire_time == event.target_time
    }
}
