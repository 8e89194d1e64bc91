//! SQLite store backend for events and subscribers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kountdown_core::error::{KountdownError, Result};
use kountdown_core::traits::{EventStore, SubscriberStore};
use kountdown_core::types::{Event, Subscriber};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

/// Single sqlite database holding both the `events` and `subscribers` tables.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| KountdownError::Store(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Fresh in-memory database, used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| KountdownError::Store(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                target_time TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS subscribers (
                name TEXT PRIMARY KEY
            );",
        )
        .map_err(|e| KountdownError::Store(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| KountdownError::Store(e.to_string()))
    }
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    let time: String = row.get(3)?;
    let target_time = DateTime::parse_from_rfc3339(&time)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
    Ok(Event {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        target_time,
    })
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn add(&self, name: &str, description: &str, target_time: DateTime<Utc>) -> Result<Event> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO events (name, description, target_time) VALUES (?1, ?2, ?3)",
            params![name, description, target_time.to_rfc3339()],
        )
        .map_err(|e| KountdownError::Store(e.to_string()))?;

        let id = conn.last_insert_rowid();
        tracing::debug!("stored event #{id}: {name}");
        Ok(Event::new(id, name, description, target_time))
    }

    async fn get(&self, id: i64) -> Result<Option<Event>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, name, description, target_time FROM events WHERE id = ?1")
            .map_err(|e| KountdownError::Store(e.to_string()))?;

        match stmt.query_row(params![id], row_to_event) {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(KountdownError::Store(e.to_string())),
        }
    }

    async fn list(&self) -> Result<Vec<Event>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, name, description, target_time FROM events ORDER BY target_time")
            .map_err(|e| KountdownError::Store(e.to_string()))?;

        let rows = stmt
            .query_map([], row_to_event)
            .map_err(|e| KountdownError::Store(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    async fn update(&self, event: &Event) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE events SET name = ?1, description = ?2, target_time = ?3 WHERE id = ?4",
                params![
                    event.name,
                    event.description,
                    event.target_time.to_rfc3339(),
                    event.id
                ],
            )
            .map_err(|e| KountdownError::Store(e.to_string()))?;
        if changed == 0 {
            return Err(KountdownError::EventNotFound(event.id));
        }
        Ok(())
    }

    async fn remove(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM events WHERE id = ?1", params![id])
            .map_err(|e| KountdownError::Store(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl SubscriberStore for SqliteStore {
    async fn subscribe(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO subscribers (name) VALUES (?1)",
            params![name],
        )
        .map_err(|e| KountdownError::Store(e.to_string()))?;
        Ok(())
    }

    async fn unsubscribe(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM subscribers WHERE name = ?1", params![name])
            .map_err(|e| KountdownError::Store(e.to_string()))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Subscriber>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT name FROM subscribers ORDER BY name")
            .map_err(|e| KountdownError::Store(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| Ok(Subscriber { name: row.get(0)? }))
            .map_err(|e| KountdownError::Store(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }
}
