//! Console dispatcher — prints notifications to stdout. Used for local runs
//! and as the default when no delivery transport is configured.

use async_trait::async_trait;
use kountdown_core::error::Result;
use kountdown_core::traits::Dispatcher;

pub struct ConsoleDispatcher;

impl ConsoleDispatcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dispatcher for ConsoleDispatcher {
    fn name(&self) -> &str {
        "console"
    }

    async fn send_direct(&self, text: &str, recipient: &str) -> Result<()> {
        println!("[msg -> {recipient}] {text}");
        Ok(())
    }

    async fn send_channel_notice(&self, text: &str, channel: &str) -> Result<()> {
        println!("[notice -> {channel}] {text}");
        Ok(())
    }
}
