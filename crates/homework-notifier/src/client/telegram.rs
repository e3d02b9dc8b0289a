//! Telegram Bot API sink

use crate::error::SinkError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Destination for notification messages
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message
    async fn send(&self, text: &str) -> Result<(), SinkError>;
}

/// Sends messages to one chat through `sendMessage`
pub struct TelegramNotifier {
    api_url: String,
    token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Create new notifier
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Delivery(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_url: api_url.into(),
            token: token.into(),
            chat_id: chat_id.into(),
            client,
        })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.token
        )
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), SinkError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        // The URL embeds the bot token, keep it out of error messages
        let response = self
            .client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| SinkError::Delivery(e.without_url().to_string()))?;

        let status = response.status();
        let body: Option<ApiResponse> = response.json().await.ok();

        match body {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse {
                description: Some(description),
                ..
            }) => Err(SinkError::Rejected(description)),
            _ => Err(SinkError::Rejected(format!("HTTP {}", status))),
        }
    }
}
