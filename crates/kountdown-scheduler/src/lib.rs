//! # Kountdown Scheduler
//!
//! The countdown scheduling engine: projects each event's target time through
//! a fixed table of lead-time offsets, keeps the resulting reminders in one
//! globally-ordered queue, and drains due reminders from a background poller.
//!
//! ## Architecture
//! ```text
//! command layer (add/edit)
//!   └── Engine.on_event_created / on_event_time_changed
//!         └── FireQueue.rebuild_for_event
//! Poller (tokio task, 5s tick)
//!   ├── FireQueue.peek_due → EventStore.get
//!   ├── notify::channel_notice / direct_message
//!   └── fan-out → Dispatcher (per subscriber)
//! ```
//!
//! The queue holds `(event_id, fire_time)` pairs sorted by fire time. Within
//! one tick only the head entry is considered, so an overdue backlog drains
//! one entry per tick rather than bursting.

pub mod engine;
pub mod notify;
pub mod offsets;
pub mod poller;
pub mod queue;

pub use engine::Engine;
pub use poller::Poller;
pub use queue::{FireQueue, build_entries_for, build_full_queue};
