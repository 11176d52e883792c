//! Configuration type definitions.

use crate::checks::{KeyAgeThresholds, ReportPoller};
use crate::cli::Cli;
use crate::notify::mapping::DEFAULT_USERS_FILE;
use crate::notify::{BotIdentity, CheckRoute};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Print debugging output to stderr.
    pub verbose: bool,
    pub slack: SlackConfig,
    /// Map of AWS users to Slack users.
    pub users_file: PathBuf,
    /// Read the account from an inventory snapshot instead of AWS.
    pub inventory: Option<PathBuf>,
    pub mfa: MfaConfig,
    pub public_s3: PublicS3Config,
    pub iam_keys: IamKeysConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            slack: SlackConfig::default(),
            users_file: PathBuf::from(DEFAULT_USERS_FILE),
            inventory: None,
            mfa: MfaConfig::default(),
            public_s3: PublicS3Config::default(),
            iam_keys: IamKeysConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Post to Slack. When false, messages go to stdout.
    pub enabled: bool,
    /// Bot token. Required when `enabled`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub bot_name: String,
    pub bot_icon: String,
    /// Override for the Slack Web API base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl Default for SlackConfig {
    fn default() -> Self {
        let identity = BotIdentity::default();
        Self {
            enabled: true,
            token: None,
            bot_name: identity.name,
            bot_icon: identity.icon,
            api_base: None,
        }
    }
}

impl SlackConfig {
    pub fn identity(&self) -> BotIdentity {
        BotIdentity {
            name: self.bot_name.clone(),
            icon: self.bot_icon.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MfaConfig {
    pub enabled: bool,
    pub channel: Option<String>,
    pub nag_users: bool,
    /// Consult the IAM credential report before per-user login lookups.
    pub credential_report: bool,
    pub report_max_attempts: u32,
    pub report_poll_interval_secs: u64,
}

impl Default for MfaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: None,
            nag_users: false,
            credential_report: true,
            report_max_attempts: 30,
            report_poll_interval_secs: 2,
        }
    }
}

impl MfaConfig {
    pub fn route(&self) -> CheckRoute {
        CheckRoute::new(self.channel.clone(), self.nag_users)
    }

    pub fn poller(&self) -> ReportPoller {
        ReportPoller::new(
            self.report_max_attempts,
            Duration::from_secs(self.report_poll_interval_secs),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicS3Config {
    pub enabled: bool,
    pub channel: Option<String>,
}

impl PublicS3Config {
    pub fn route(&self) -> CheckRoute {
        CheckRoute::new(self.channel.clone(), false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IamKeysConfig {
    pub enabled: bool,
    pub channel: Option<String>,
    pub nag_users: bool,
    /// Age in days after which keys get a warning.
    pub warn_age: Option<i64>,
    /// Age in days keys are not allowed to exceed.
    pub expire_age: Option<i64>,
}

impl IamKeysConfig {
    pub fn route(&self) -> CheckRoute {
        CheckRoute::new(self.channel.clone(), self.nag_users)
    }

    /// Thresholds, once both ages are present.
    pub fn thresholds(&self) -> Option<KeyAgeThresholds> {
        Some(KeyAgeThresholds::new(self.warn_age?, self.expire_age?))
    }
}

impl Config {
    /// Apply command-line flags on top of the file configuration. Flags only
    /// ever switch features on or replace values.
    pub fn merge_cli(&mut self, cli: &Cli) {
        self.verbose |= cli.verbose;

        if cli.no_slack {
            self.slack.enabled = false;
        }
        if let Some(ref token) = cli.slack_token {
            self.slack.token = Some(token.clone());
        }
        if let Some(ref path) = cli.users_file {
            self.users_file = path.clone();
        }
        if let Some(ref path) = cli.inventory {
            self.inventory = Some(path.clone());
        }

        self.mfa.enabled |= cli.mfa;
        self.mfa.nag_users |= cli.mfa_nag_users;
        if let Some(ref channel) = cli.mfa_channel {
            self.mfa.channel = Some(channel.clone());
        }

        self.public_s3.enabled |= cli.public_s3;
        if let Some(ref channel) = cli.public_s3_channel {
            self.public_s3.channel = Some(channel.clone());
        }

        self.iam_keys.enabled |= cli.iam_keys;
        self.iam_keys.nag_users |= cli.iam_keys_nag_users;
        if let Some(ref channel) = cli.iam_keys_channel {
            self.iam_keys.channel = Some(channel.clone());
        }
        if cli.iam_keys_warn_age.is_some() {
            self.iam_keys.warn_age = cli.iam_keys_warn_age;
        }
        if cli.iam_keys_expire_age.is_some() {
            self.iam_keys.expire_age = cli.iam_keys_expire_age;
        }
    }

    /// Whether any enabled check wants to message users directly.
    pub fn wants_user_map(&self) -> bool {
        (self.mfa.enabled && self.mfa.nag_users) || (self.iam_keys.enabled && self.iam_keys.nag_users)
    }

    pub fn any_check_enabled(&self) -> bool {
        self.mfa.enabled || self.public_s3.enabled || self.iam_keys.enabled
    }
}
