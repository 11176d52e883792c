use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "aws-security-bot",
    version,
    about = "Audit an AWS account for security problems and report them to Slack",
    long_about = "aws-security-bot checks IAM access key age, MFA usage and public S3 buckets, then posts the results to Slack channels and optionally messages the offending users directly."
)]
pub struct Cli {
    /// Print debugging output to stderr
    #[arg(short, long, env = "VERBOSE")]
    pub verbose: bool,

    /// Print messages to stdout instead of posting to Slack
    #[arg(long, env = "NO_SLACK")]
    pub no_slack: bool,

    /// Slack bot token
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    pub slack_token: Option<String>,

    /// Check that every user with a console login has an MFA device
    #[arg(long, env = "MFA")]
    pub mfa: bool,

    /// Slack channel for MFA results
    #[arg(long, env = "MFA_CHANNEL")]
    pub mfa_channel: Option<String>,

    /// Message users without MFA directly
    #[arg(long, env = "MFA_NAG_USERS")]
    pub mfa_nag_users: bool,

    /// Check for S3 buckets with public ACL grants
    #[arg(long, env = "PUBLIC_S3")]
    pub public_s3: bool,

    /// Slack channel for public S3 results
    #[arg(long, env = "PUBLIC_S3_CHANNEL")]
    pub public_s3_channel: Option<String>,

    /// Check IAM access key age
    #[arg(long, env = "IAM_KEYS")]
    pub iam_keys: bool,

    /// Slack channel for IAM access key results
    #[arg(long, env = "IAM_KEYS_CHANNEL")]
    pub iam_keys_channel: Option<String>,

    /// Message users with old access keys directly
    #[arg(long, env = "IAM_KEYS_NAG_USERS")]
    pub iam_keys_nag_users: bool,

    /// Age in days after which keys get a warning
    #[arg(long, env = "IAM_KEYS_WARN_AGE", allow_negative_numbers = true)]
    pub iam_keys_warn_age: Option<i64>,

    /// Age in days keys are not allowed to exceed
    #[arg(long, env = "IAM_KEYS_EXPIRE_AGE", allow_negative_numbers = true)]
    pub iam_keys_expire_age: Option<i64>,

    /// YAML map of AWS user names to Slack user names
    #[arg(long, env = "USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// Config file (.yaml, .yml, .json or .toml)
    #[arg(short, long, env = "AWS_SECURITY_BOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read users and buckets from a JSON inventory snapshot instead of AWS
    #[arg(long, env = "INVENTORY")]
    pub inventory: Option<PathBuf>,
}
