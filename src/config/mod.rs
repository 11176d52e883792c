//! Configuration for aws-security-bot.
//!
//! Settings come from an optional config file, overridden by command-line
//! flags and their environment variables. [`Config::validate`] runs before
//! any call to AWS or Slack.

mod error;
mod loading;
mod types;
mod validation;

pub use error::{ConfigError, ConfigFormat};
pub use types::{Config, IamKeysConfig, MfaConfig, PublicS3Config, SlackConfig};
