//! Error types for aws-security-bot.
//!
//! Every fatal condition of a run ends up as a [`BotError`]. Recoverable
//! conditions (an unreadable user map, a principal without a login profile)
//! are handled where they occur and never reach this type.

mod cloud;

pub use cloud::CloudError;

use crate::checks::credential_report::{ReportError, ReportPollError};
use crate::config::ConfigError;
use crate::transport::TransportError;
use thiserror::Error;

/// Fatal error that aborts the run.
#[derive(Error, Debug)]
pub enum BotError {
    /// Invalid flag combination, detected before any external call.
    #[error("{}", .0.join("\n"))]
    Configuration(Vec<String>),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("Invalid credential report: {0}")]
    Report(#[from] ReportError),

    #[error("Timed out waiting for the credential report after {attempts} attempts")]
    ReportTimedOut { attempts: u32 },

    #[error("Posting to Slack was unsuccessful. Slack said: {0}")]
    Transport(String),

    #[error("Failed to write to the console: {0}")]
    Console(#[source] std::io::Error),
}

impl BotError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(vec![message.into()])
    }

    /// Whether the error comes from the configuration rather than the run.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::ConfigFile(_))
    }
}

impl From<ReportPollError> for BotError {
    fn from(err: ReportPollError) -> Self {
        match err {
            ReportPollError::Cloud(e) => Self::Cloud(e),
            ReportPollError::Report(e) => Self::Report(e),
        }
    }
}

impl From<TransportError> for BotError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type alias for operations that can abort the run.
pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_joins_problems() {
        let err = BotError::Configuration(vec![
            "--slack-token must be specified".to_string(),
            "--mfa-channel must be specified".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "--slack-token must be specified\n--mfa-channel must be specified"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_transport_display() {
        let err = BotError::Transport("channel_not_found".to_string());
        assert_eq!(
            err.to_string(),
            "Posting to Slack was unsuccessful. Slack said: channel_not_found"
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_report_timed_out_display() {
        let err = BotError::ReportTimedOut { attempts: 5 };
        assert!(err.to_string().contains("5 attempts"));
    }

    #[test]
    fn test_from_cloud_error_is_transparent() {
        let err: BotError = CloudError::request("ListUsers", "AccessDenied").into();
        assert_eq!(err.to_string(), "ListUsers failed: AccessDenied");
    }
}
