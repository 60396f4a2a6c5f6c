use std::time::Duration;

use reqwest::Client;

use super::channel::{Notifier, NotifyError};

pub struct SlackNotifier {
    client: Client,
}

impl SlackNotifier {
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

pub fn payload(text: &str) -> serde_json::Value {
    serde_json::json!({ "text": text })
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &str {
        "slack"
    }

    async fn send(&self, webhook_url: &str, text: &str) -> Result<(), NotifyError> {
        self.client
            .post(webhook_url)
            .json(&payload(text))
            .send()
            .await
            .map_err(|e| NotifyError(e.to_string()))?
            .error_for_status()
            .map_err(|e| NotifyError(e.to_string()))?;

        Ok(())
    }
}
