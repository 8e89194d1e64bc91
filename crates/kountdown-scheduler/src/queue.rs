//! The fire queue: every pending reminder across all events, globally ordered
//! by fire time, plus the pure projection from events to reminder entries.

use chrono::{DateTime, Duration, Utc};
use kountdown_core::types::{Event, FireEntry};
use std::sync::Mutex;

use crate::offsets::offsets;

fn entries_with(table: &[i64], event: &Event, now: DateTime<Utc>) -> Vec<FireEntry> {
    let mut entries: Vec<FireEntry> = table
        .iter()
        .map(|&o| FireEntry::new(event.id, event.target_time - Duration::seconds(o)))
        .filter(|e| e.fire_time >= now)
        .collect();
    entries.sort_by_key(|e| (e.fire_time, e.event_id));
    entries
}

/// Project one event through the offset table. One entry per offset whose
/// fire time has not yet passed, ascending by fire time. Empty when every
/// offset has already elapsed.
pub fn build_entries_for(event: &Event, now: DateTime<Utc>) -> Vec<FireEntry> {
    entries_with(offsets(), event, now)
}

/// Project every event still in the future. Events whose target time has
/// passed contribute nothing, not even the terminal entry. Result is sorted
/// ascending by fire time across all events.
pub fn build_full_queue(events: &[Event], now: DateTime<Utc>) -> Vec<FireEntry> {
    let mut queue: Vec<FireEntry> = events
        .iter()
        .filter(|e| e.target_time >= now)
        .flat_map(|e| build_entries_for(e, now))
        .collect();
    queue.sort_by_key(|e| (e.fire_time, e.event_id));
    queue
}

/// The shared queue of pending reminders.
///
/// All multi-step read-modify-write sequences happen inside one exclusive
/// lock. The lock is never held across an await point; the poller peeks under
/// the lock, resolves the event outside it, then removes the entry with
/// [`FireQueue::pop_if_head`] so a concurrent rebuild can never cause the
/// wrong entry to be dropped.
pub struct FireQueue {
    inner: Mutex<Vec<FireEntry>>,
}

impl FireQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<FireEntry>> {
        // A panicking holder poisons the mutex but the entries stay a valid
        // vector; recover and keep scheduling rather than take the process
        // down. The next rebuild restores any half-applied mutation.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Atomically replace every entry belonging to `event` with a freshly
    /// computed set. Called when an event is created or its target time edited.
    pub fn rebuild_for_event(&self, event: &Event, now: DateTime<Utc>) {
        let mut queue = self.lock();
        queue.retain(|e| e.event_id != event.id);
        queue.extend(build_entries_for(event, now));
        queue.sort_by_key(|e| (e.fire_time, e.event_id));
        tracing::debug!(
            "queue rebuilt for event #{}: {} pending entries total",
            event.id,
            queue.len()
        );
    }

    /// Discard the queue and rebuild it from the full event list. Called at
    /// startup and after a terminal (zero-offset) entry fires, to drop the
    /// exhausted event and admit any created meanwhile.
    pub fn rebuild_all(&self, events: &[Event], now: DateTime<Utc>) {
        let mut queue = self.lock();
        *queue = build_full_queue(events, now);
        tracing::debug!("queue rebuilt from store: {} pending entries", queue.len());
    }

    /// The head entry, if it is due at `now`. Leaves the queue untouched.
    /// `None` covers both "empty" and "nothing due yet" — the normal idle
    /// states, not errors.
    pub fn peek_due(&self, now: DateTime<Utc>) -> Option<FireEntry> {
        let queue = self.lock();
        queue.first().filter(|e| e.fire_time <= now).copied()
    }

    /// Remove the head iff it still equals `entry`. Returns false when a
    /// concurrent rebuild changed the head since it was peeked, in which case
    /// the caller skips this tick and re-evaluates on the next one.
    pub fn pop_if_head(&self, entry: &FireEntry) -> bool {
        let mut queue = self.lock();
        if queue.first() == Some(entry) {
            queue.remove(0);
            true
        } else {
            false
        }
    }

    /// Drop a peeked entry whose event no longer exists in the store.
    /// Same conditional-head semantics as [`FireQueue::pop_if_head`].
    pub fn discard_stale(&self, entry: &FireEntry) -> bool {
        let dropped = self.pop_if_head(entry);
        if dropped {
            tracing::debug!(
                "discarded stale entry for deleted event #{}",
                entry.event_id
            );
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current entries, in queue order.
    pub fn snapshot(&self) -> Vec<FireEntry> {
        self.lock().clone()
    }
}

impl Default for FireQueue {
    fn default() -> Self {
        Self::new()
    }
}
