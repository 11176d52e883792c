//! Outbound delivery: the Slack chat transport and the console sink.

mod console;
mod slack;

pub use console::{ConsoleSink, StdoutSink};
pub use slack::SlackTransport;

use serde::Deserialize;
use thiserror::Error;

/// Response of a chat post. `ok == false` is a delivery failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl PostResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected response: {0}")]
    Response(String),
}

/// A chat service able to post a message to a channel or a user.
pub trait ChatTransport {
    fn post_message(
        &self,
        destination: &str,
        sender_name: &str,
        icon: &str,
        text: &str,
    ) -> Result<PostResponse, TransportError>;
}
