//! Background poller — wakes on a fixed interval, fires the due head entry,
//! and fans the notification out to every subscriber.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use kountdown_core::error::Result;
use kountdown_core::traits::{Dispatcher, EventStore, SubscriberStore};

use crate::notify;
use crate::queue::FireQueue;

/// Default seconds between ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct Poller {
    queue: Arc<FireQueue>,
    events: Arc<dyn EventStore>,
    subscribers: Arc<dyn SubscriberStore>,
    dispatcher: Arc<dyn Dispatcher>,
    interval: Duration,
    running: AtomicBool,
}

impl Poller {
    pub fn new(
        queue: Arc<FireQueue>,
        events: Arc<dyn EventStore>,
        subscribers: Arc<dyn SubscriberStore>,
        dispatcher: Arc<dyn Dispatcher>,
        interval: Duration,
    ) -> Self {
        Self {
            queue,
            events,
            subscribers,
            dispatcher,
            interval,
            running: AtomicBool::new(true),
        }
    }

    /// Spawn the poll loop as a background task.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Ask the loop to stop after the current tick.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Sleep-then-poll loop. A failed tick is logged and the loop carries on;
    /// nothing here is fatal to the process.
    pub async fn run(&self) {
        tracing::info!(
            "poller started via {} dispatch, interval {:?}",
            self.dispatcher.name(),
            self.interval
        );
        while self.running.load(Ordering::Relaxed) {
            tokio::time::sleep(self.interval).await;
            if !self.running.load(Ordering::Relaxed) {
                break;
            }
            if let Err(e) = self.tick(Utc::now()).await {
                tracing::warn!("poller tick failed: {e}");
            }
        }
        tracing::info!("poller stopped");
    }

    /// One poll step. At most the single head entry is processed, so an
    /// overdue backlog drains one entry per tick — paced delivery, not a bug.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<()> {
        // Another process may have written events since the last build. An
        // idle queue has no backlog to lose, so it is the safe moment to
        // reconcile with the store and admit them.
        if self.queue.is_empty() {
            let all = self.events.list().await?;
            if !all.is_empty() {
                self.queue.rebuild_all(&all, now);
            }
        }

        let Some(head) = self.queue.peek_due(now) else {
            return Ok(());
        };

        // Resolve outside the queue lock. A concurrently deleted event is not
        // an error; its stale entry is discarded without notifying anyone.
        let Some(event) = self.events.get(head.event_id).await? else {
            self.queue.discard_stale(&head);
            return Ok(());
        };

        let notice = notify::channel_notice(&event, head.fire_time);
        let message = notify::direct_message(&event, head.fire_time);

        // Take the entry before delivery so the lock is never held across the
        // fan-out. If a rebuild moved the head since the peek, skip this tick
        // and re-evaluate on the next one.
        if !self.queue.pop_if_head(&head) {
            tracing::debug!("queue head changed during resolution, skipping tick");
            return Ok(());
        }

        for subscriber in self.subscribers.list().await? {
            let sent = if subscriber.is_channel() {
                self.dispatcher
                    .send_channel_notice(&notice, &subscriber.name)
                    .await
            } else {
                self.dispatcher.send_direct(&message, &subscriber.name).await
            };
            if let Err(e) = sent {
                tracing::warn!("delivery to {} failed: {e}", subscriber.name);
            }
        }

        if head.is_terminal(&event) {
            // The event has arrived: reconcile with the store to drop it and
            // admit anything created since the last full build.
            let all = self.events.list().await?;
            self.queue.rebuild_all(&all, now);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use kountdown_core::types::FireEntry;
    use kountdown_store::SqliteStore;
    use std::sync::Mutex;

    /// Records every delivery instead of sending it; one entry per recipient.
    struct RecordingDispatcher {
        sent: Mutex<Vec<(String, String, String)>>,
        fail_for: Option<String>,
    }

    impl RecordingDispatcher {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_for: None,
            }
        }

        fn failing_for(name: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_for: Some(name.into()),
            }
        }

        fn record(&self, kind: &str, text: &str, recipient: &str) -> Result<()> {
            if self.fail_for.as_deref() == Some(recipient) {
                return Err(kountdown_core::KountdownError::dispatch("boom"));
            }
            self.sent
                .lock()
                .expect("recorder lock poisoned")
                .push((kind.into(), recipient.into(), text.into()));
            Ok(())
        }

        fn sent(&self) -> Vec<(String, String, String)> {
            self.sent.lock().expect("recorder lock poisoned").clone()
        }
    }

    #[async_trait]
    impl Dispatcher for RecordingDispatcher {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send_direct(&self, text: &str, recipient: &str) -> Result<()> {
            self.record("direct", text, recipient)
        }

        async fn send_channel_notice(&self, text: &str, channel: &str) -> Result<()> {
            self.record("notice", text, channel)
        }
    }

    struct Fixture {
        store: Arc<SqliteStore>,
        queue: Arc<FireQueue>,
        dispatcher: Arc<RecordingDispatcher>,
        poller: Poller,
    }

    fn fixture(dispatcher: RecordingDispatcher) -> Fixture {
        let store = Arc::new(SqliteStore::in_memory().expect("in-memory db"));
        let queue = Arc::new(FireQueue::new());
        let dispatcher = Arc::new(dispatcher);
        let poller = Poller::new(
            queue.clone(),
            store.clone(),
            store.clone(),
            dispatcher.clone(),
            DEFAULT_POLL_INTERVAL,
        );
        Fixture {
            store,
            queue,
            dispatcher,
            poller,
        }
    }

    #[tokio::test]
    async fn test_fan_out_completeness() {
        let f = fixture(RecordingDispatcher::new());
        let now = Utc::now();

        // Target one hour out: the 1h-mark entry is due immediately.
        let event = f
            .store
            .add("launch", "big", now + ChronoDuration::seconds(3600))
            .await
            .expect("add");
        f.store.subscribe("alice").await.expect("sub");
        f.store.subscribe("#ops").await.expect("sub");
        f.queue.rebuild_for_event(&event, now);

        let before = f.queue.len();
        f.poller.tick(now).await.expect("tick");

        let sent = f.dispatcher.sent();
        assert_eq!(sent.len(), 2);

        let to_channel = sent.iter().find(|(_, r, _)| r == "#ops").expect("#ops");
        assert_eq!(to_channel.0, "notice");
        assert!(to_channel.2.contains("Say '!kountdown"));

        let to_user = sent.iter().find(|(_, r, _)| r == "alice").expect("alice");
        assert_eq!(to_user.0, "direct");
        assert!(to_user.2.starts_with("<< ! >>"));
        assert!(to_user.2.contains("(big)"));

        // The fired entry was removed, the rest stayed.
        assert_eq!(f.queue.len(), before - 1);
    }

    #[tokio::test]
    async fn test_nothing_due_is_a_noop() {
        let f = fixture(RecordingDispatcher::new());
        let now = Utc::now();
        let event = f
            .store
            .add("later", "", now + ChronoDuration::days(30))
            .await
            .expect("add");
        f.queue.rebuild_for_event(&event, now);

        f.poller.tick(now).await.expect("tick");
        assert!(f.dispatcher.sent().is_empty());
        assert_eq!(f.queue.len(), offsets_len());
    }

    fn offsets_len() -> usize {
        crate::offsets::offsets().len()
    }

    #[tokio::test]
    async fn test_deleted_event_entry_is_discarded_silently() {
        let f = fixture(RecordingDispatcher::new());
        let now = Utc::now();
        let event = f
            .store
            .add("gone", "", now + ChronoDuration::seconds(3600))
            .await
            .expect("add");
        f.store.subscribe("alice").await.expect("sub");
        f.queue.rebuild_for_event(&event, now);
        f.store.remove(event.id).await.expect("remove");

        let before = f.queue.len();
        f.poller.tick(now).await.expect("tick");

        assert!(f.dispatcher.sent().is_empty());
        assert_eq!(f.queue.len(), before - 1);
    }

    #[tokio::test]
    async fn test_terminal_fire_triggers_full_rebuild() {
        let f = fixture(RecordingDispatcher::new());
        let target = Utc::now() - ChronoDuration::seconds(1);
        let event = f.store.add("arrived", "", target).await.expect("add");
        f.store.subscribe("alice").await.expect("sub");

        // Only the terminal entry was still pending when it was scheduled.
        f.queue.rebuild_for_event(&event, target);
        assert_eq!(
            f.queue.snapshot(),
            vec![FireEntry::new(event.id, target)]
        );

        // A second event created meanwhile must be admitted by the rebuild.
        let upcoming = f
            .store
            .add("next", "", target + ChronoDuration::days(30))
            .await
            .expect("add");

        f.poller.tick(target + ChronoDuration::seconds(1)).await.expect("tick");

        assert_eq!(f.dispatcher.sent().len(), 1);
        let snapshot = f.queue.snapshot();
        assert!(!snapshot.is_empty());
        assert!(snapshot.iter().all(|e| e.event_id == upcoming.id));
    }

    #[tokio::test]
    async fn test_recipient_failure_does_not_abort_fan_out() {
        let f = fixture(RecordingDispatcher::failing_for("alice"));
        let now = Utc::now();
        let event = f
            .store
            .add("launch", "", now + ChronoDuration::seconds(3600))
            .await
            .expect("add");
        f.store.subscribe("alice").await.expect("sub");
        f.store.subscribe("bob").await.expect("sub");
        f.store.subscribe("#ops").await.expect("sub");
        f.queue.rebuild_for_event(&event, now);

        f.poller.tick(now).await.expect("tick");

        let recipients: Vec<String> =
            f.dispatcher.sent().iter().map(|(_, r, _)| r.clone()).collect();
        assert!(recipients.contains(&"bob".to_string()));
        assert!(recipients.contains(&"#ops".to_string()));
        assert!(!recipients.contains(&"alice".to_string()));
    }

    #[tokio::test]
    async fn test_backlog_drains_one_entry_per_tick() {
        let f = fixture(RecordingDispatcher::new());
        let now = Utc::now();
        let event = f
            .store
            .add("launch", "", now + ChronoDuration::seconds(3600))
            .await
            .expect("add");
        f.store.subscribe("alice").await.expect("sub");
        f.queue.rebuild_for_event(&event, now);

        // Far past the target: every remaining entry is overdue, but each
        // tick fires only the head.
        let late = now + ChronoDuration::seconds(7200);
        let before = f.queue.len();
        f.poller.tick(late).await.expect("tick");
        assert_eq!(f.queue.len(), before - 1);
        assert_eq!(f.dispatcher.sent().len(), 1);

        f.poller.tick(late).await.expect("tick");
        assert_eq!(f.dispatcher.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_idle_queue_admits_events_created_after_startup() {
        // The store starts empty, so the queue starts (and stays) empty.
        let f = fixture(RecordingDispatcher::new());
        let now = Utc::now();
        f.store.subscribe("alice").await.expect("sub");
        f.poller.tick(now).await.expect("tick");
        assert!(f.queue.is_empty());

        // An event written by another process after startup must still be
        // picked up: the idle tick reconciles with the store.
        let event = f
            .store
            .add("late arrival", "", now + ChronoDuration::seconds(3600))
            .await
            .expect("add");

        f.poller.tick(now).await.expect("tick");
        assert!(f.queue.snapshot().iter().all(|e| e.event_id == event.id));

        // The 1h mark was due at creation time and got announced same tick.
        let sent = f.dispatcher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "alice");

        // Once scheduled, later ticks drain normally instead of rebuilding.
        let remaining = f.queue.len();
        f.poller.tick(now).await.expect("tick");
        assert_eq!(f.queue.len(), remaining);
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let f = fixture(RecordingDispatcher::new());
        let poller = Arc::new(Poller::new(
            f.queue.clone(),
            f.store.clone(),
            f.store.clone(),
            f.dispatcher.clone(),
            Duration::from_millis(10),
        ));
        let handle = poller.clone().spawn();
        poller.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller should stop promptly")
            .expect("task should not panic");
    }
}
