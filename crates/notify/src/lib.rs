//! Plain-text webhook notifications
//!
//! Fire-and-forget channel messages about pipeline runs. Delivery failures
//! are logged and swallowed; notifications must never affect a metrics run.

use serde_json::json;
use tracing::{debug, error};

/// Channel name announced in the webhook payload
const CHANNEL: &str = "#metrics";
/// Sender name announced in the webhook payload
const USERNAME: &str = "repo-pulse";

pub struct Notifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl Notifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }

    /// Send a plain-text message to the configured webhook, if any
    pub async fn send(&self, message: &str) {
        let Some(url) = self.webhook_url.as_ref() else {
            debug!("No webhook configured, dropping notification: {}", message);
            return;
        };
        let payload = json!({
            "channel": CHANNEL,
            "username": USERNAME,
            "Content": message,
            "icon_emoji": "",
        });
        match self.client.post(url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!("Notification delivered: {}", message);
            }
            Ok(resp) => {
                error!("Webhook returned {} for notification", resp.status());
            }
            Err(e) => {
                error!("Failed to deliver notification: {}", e);
            }
        }
    }
}
