//! # Kountdown Store
//! SQLite-backed persistence for events and subscribers.

pub mod sqlite;

pub use sqlite::SqliteStore;
