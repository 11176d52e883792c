//! Slack Web API transport.
//!
//! Posts through `chat.postMessage` with the bot token. One client is built
//! per run and reused for every message.

use super::{ChatTransport, PostResponse, TransportError};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Base URL for the Slack Web API.
const SLACK_API_BASE: &str = "https://slack.com/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SlackTransport {
    http: Client,
    token: String,
    base_url: String,
}

impl SlackTransport {
    /// Create a transport with the given bot token.
    pub fn new(token: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_base_url(token, SLACK_API_BASE)
    }

    /// Create a transport pointing at a custom API base URL.
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            http,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Return the base URL used for API requests.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ChatTransport for SlackTransport {
    fn post_message(
        &self,
        destination: &str,
        sender_name: &str,
        icon: &str,
        text: &str,
    ) -> Result<PostResponse, TransportError> {
        let url = format!("{}/chat.postMessage", self.base_url);
        let body = serde_json::json!({
            "channel": destination,
            "username": sender_name,
            "icon_emoji": icon,
            "text": text,
        });

        debug!(channel = %destination, "posting message");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Ok(PostResponse::failed(format!("HTTP {}", status)));
        }

        resp.json::<PostResponse>()
            .map_err(|e| TransportError::Response(e.to_string()))
    }
}
