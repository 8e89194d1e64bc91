//! Webhook dispatcher — POSTs each notification as JSON to a configured URL.
//!
//! Useful for bridging into chat gateways or automation tools (n8n, custom
//! relays) that forward to the actual transport.

use async_trait::async_trait;
use kountdown_core::error::{KountdownError, Result};
use kountdown_core::traits::Dispatcher;
use serde::{Deserialize, Serialize};

/// Webhook dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// URL to POST notifications to.
    pub url: String,
}

/// Outbound payload, one per recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookPayload {
    /// "direct" or "notice".
    pub kind: String,
    pub recipient: String,
    pub text: String,
}

pub struct WebhookDispatcher {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookDispatcher {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn payload(kind: &str, recipient: &str, text: &str) -> WebhookPayload {
        WebhookPayload {
            kind: kind.into(),
            recipient: recipient.into(),
            text: text.into(),
        }
    }

    async fn post(&self, payload: &WebhookPayload) -> Result<()> {
        self.client
            .post(&self.config.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| KountdownError::Dispatch(format!("Webhook send failed: {e}")))?
            .error_for_status()
            .map_err(|e| KountdownError::Dispatch(format!("Webhook rejected: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for WebhookDispatcher {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send_direct(&self, text: &str, recipient: &str) -> Result<()> {
        self.post(&Self::payload("direct", recipient, text)).await
    }

    async fn send_channel_notice(&self, text: &str, channel: &str) -> Result<()> {
        self.post(&Self::payload("notice", channel, text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = WebhookDispatcher::payload("notice", "#ops", "1h left");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "notice");
        assert_eq!(json["recipient"], "#ops");
        assert_eq!(json["text"], "1h left");
    }

    #[tokio::test]
    async fn test_unreachable_url_is_dispatch_error() {
        // Port 9 (discard) is never listening locally.
        let dispatcher = WebhookDispatcher::new(WebhookConfig {
            url: "http://127.0.0.1:9/hook".into(),
        });
        let err = dispatcher.send_direct("hi", "alice").await.unwrap_err();
        assert!(matches!(err, KountdownError::Dispatch(_)));
    }
}
