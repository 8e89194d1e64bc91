//! # Kountdown Core
//! Shared types, collaborator traits, error type, and configuration for the
//! Kountdown countdown-notification system.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::KountdownConfig;
pub use error::{KountdownError, Result};
pub use types::{Event, FireEntry, Subscriber};
