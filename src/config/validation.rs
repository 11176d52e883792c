//! Flag combination checks, run before any call to AWS or Slack.

use super::types::Config;
use crate::checks::key_age::MAX_KEY_AGE_DAYS;
use crate::error::BotError;

impl Config {
    /// Collect every problem with the configuration at once.
    pub fn validate(&self) -> Result<(), BotError> {
        let mut errors = Vec::new();

        if self.slack.enabled && self.slack.token.as_deref().is_none_or(str::is_empty) {
            errors.push(
                "--slack-token must be specified if you're not suppressing Slack output with --no-slack"
                    .to_string(),
            );
        }

        if self.mfa.enabled && self.slack.enabled && self.mfa.channel.is_none() {
            errors.push(
                "--mfa-channel must be specified if you're using --mfa without --no-slack".to_string(),
            );
        }

        if self.public_s3.enabled && self.slack.enabled && self.public_s3.channel.is_none() {
            errors.push(
                "--public-s3-channel must be specified if you're using --public-s3 without --no-slack"
                    .to_string(),
            );
        }

        if self.iam_keys.enabled {
            if self.slack.enabled && self.iam_keys.channel.is_none() {
                errors.push(
                    "--iam-keys-channel must be specified if you're using --iam-keys without --no-slack"
                        .to_string(),
                );
            }

            let warn = self.iam_keys.warn_age;
            let expire = self.iam_keys.expire_age;
            if warn.is_none() {
                errors.push("--iam-keys-warn-age must be specified if you're using --iam-keys".to_string());
            }
            if expire.is_none() {
                errors.push("--iam-keys-expire-age must be specified if you're using --iam-keys".to_string());
            }
            if warn.is_some_and(|days| days <= 0) {
                errors.push("--iam-keys-warn-age must be a positive number of days".to_string());
            }
            if expire.is_some_and(|days| days <= 0) {
                errors.push("--iam-keys-expire-age must be a positive number of days".to_string());
            }
            if warn.is_some_and(|days| days > MAX_KEY_AGE_DAYS) {
                errors.push(format!(
                    "--iam-keys-warn-age must be at most {} days",
                    MAX_KEY_AGE_DAYS
                ));
            }
            if expire.is_some_and(|days| days > MAX_KEY_AGE_DAYS) {
                errors.push(format!(
                    "--iam-keys-expire-age must be at most {} days",
                    MAX_KEY_AGE_DAYS
                ));
            }
            if let (Some(warn), Some(expire)) = (warn, expire)
                && warn >= expire
            {
                errors.push("--iam-keys-expire-age must be greater than --iam-keys-warn-age".to_string());
            }
        }

        if self.mfa.enabled && self.mfa.report_max_attempts == 0 {
            errors.push("mfa.report_max_attempts must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BotError::Configuration(errors))
        }
    }
}
