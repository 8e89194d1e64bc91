//! Unified error types for Kountdown.

use thiserror::Error;

/// Result type alias using KountdownError.
pub type Result<T> = std::result::Result<T, KountdownError>;

#[derive(Error, Debug)]
pub enum KountdownError {
    // Store errors
    #[error("Store error: {0}")]
    Store(String),

    #[error("Event not found: {0}")]
    EventNotFound(i64),

    // Dispatch errors
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KountdownError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
