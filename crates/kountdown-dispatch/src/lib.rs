//! # Kountdown Dispatch
//! Dispatcher implementations — how a formatted notification reaches a
//! recipient. The scheduling core only knows the `Dispatcher` trait.

pub mod console;
pub mod webhook;

use std::sync::Arc;

use kountdown_core::KountdownConfig;
use kountdown_core::error::{KountdownError, Result};
use kountdown_core::traits::Dispatcher;

pub use console::ConsoleDispatcher;
pub use webhook::{WebhookConfig, WebhookDispatcher};

/// Build the dispatcher named by the configuration.
pub fn create_dispatcher(config: &KountdownConfig) -> Result<Arc<dyn Dispatcher>> {
    match config.dispatch.mode.as_str() {
        "console" => Ok(Arc::new(ConsoleDispatcher::new())),
        "webhook" => {
            let url = config.dispatch.webhook_url.clone().ok_or_else(|| {
                KountdownError::config("dispatch.webhook_url is required for webhook mode")
            })?;
            Ok(Arc::new(WebhookDispatcher::new(WebhookConfig { url })))
        }
        other => Err(KountdownError::config(format!(
            "unknown dispatch mode: {other}"
        ))),
    }
}
