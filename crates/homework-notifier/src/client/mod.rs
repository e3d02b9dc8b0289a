//! HTTP clients for the external collaborators
//!
//! `StatusSource` is the remote homework status API, `Notifier` is the
//! message sink. The poll loop only sees the traits.

pub mod telegram;

pub use telegram::{Notifier, TelegramNotifier};

use crate::contracts::{json_kind, Cursor, RawResponse};
use crate::error::{NotifierError, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;

/// Query parameter carrying the cursor
pub const CURSOR_PARAM: &str = "from_date";

/// Source of homework status snapshots
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// One request/response cycle for everything changed since `cursor`
    async fn fetch(&self, cursor: Cursor) -> Result<RawResponse>;
}

/// Homework status API client
pub struct PracticumClient {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

impl PracticumClient {
    /// Create new client
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifierError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        })
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, cursor: Cursor) -> Result<RawResponse> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[(CURSOR_PARAM, cursor.as_secs())])
            .send()
            .await
            .map_err(|e| NotifierError::transport(format!("Failed to reach status API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifierError::transport(format!(
                "Status API responded with {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| NotifierError::transport(format!("Failed to read response body: {}", e)))?;

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| NotifierError::shape(format!("Response body is not valid JSON: {}", e)))?;

        RawResponse::from_value(value).map_err(|other| {
            NotifierError::shape(format!(
                "Expected a JSON object, got {}",
                json_kind(&other)
            ))
        })
    }
}
