//! One audit run: pick the account backend, build the transport once, then
//! execute the enabled checks in order and route each result.

use crate::aggregator::AuditSummary;
use crate::checks::{CredentialReport, KeyAgeCheck, MfaCheck, PublicBucketCheck, ReportPoll};
#[cfg(feature = "aws")]
use crate::cloud::AwsBackend;
use crate::cloud::{IamReader, SnapshotBackend, StorageReader};
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::notify::{Delivery, PrincipalChatMap, Router};
use crate::transport::{SlackTransport, StdoutSink};
use crate::types::Principal;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// The account under audit.
pub enum Account {
    Snapshot(SnapshotBackend),
    #[cfg(feature = "aws")]
    Aws(Box<AwsBackend>),
}

impl Account {
    /// Open the inventory snapshot if one is configured, otherwise AWS.
    pub fn open(config: &Config) -> Result<Self> {
        if let Some(ref path) = config.inventory {
            info!(path = %path.display(), "Reading the account from an inventory snapshot");
            return Ok(Account::Snapshot(SnapshotBackend::from_file(path)?));
        }

        #[cfg(feature = "aws")]
        {
            Ok(Account::Aws(Box::new(AwsBackend::from_env()?)))
        }

        #[cfg(not(feature = "aws"))]
        {
            Err(BotError::configuration(
                "--inventory must be specified when built without AWS support",
            ))
        }
    }

    pub fn iam(&self) -> &dyn IamReader {
        match self {
            Account::Snapshot(backend) => backend,
            #[cfg(feature = "aws")]
            Account::Aws(backend) => &**backend,
        }
    }

    pub fn storage(&self) -> &dyn StorageReader {
        match self {
            Account::Snapshot(backend) => backend,
            #[cfg(feature = "aws")]
            Account::Aws(backend) => &**backend,
        }
    }
}

/// Load the user map when some check nags. A map that cannot be loaded turns
/// nagging off for the run.
pub fn load_user_map(config: &Config) -> Option<PrincipalChatMap> {
    if !config.wants_user_map() {
        return None;
    }

    match PrincipalChatMap::load(&config.users_file) {
        Ok(map) => {
            if map.is_empty() {
                warn!(path = %config.users_file.display(), "User map is empty; every user will be reported as unmapped");
            } else {
                debug!(path = %config.users_file.display(), users = map.len(), "Loaded the user map");
            }
            Some(map)
        }
        Err(e) => {
            warn!("{}; users will not be messaged directly", e);
            None
        }
    }
}

/// Run the configured audit end to end.
pub fn run(config: &Config) -> Result<AuditSummary> {
    config.validate()?;

    if !config.any_check_enabled() {
        warn!("No checks enabled; pass --mfa, --public-s3 or --iam-keys");
        return Ok(AuditSummary::new());
    }

    let account = Account::open(config)?;
    let user_map = load_user_map(config);

    let slack: SlackTransport;
    let mut stdout = StdoutSink::new();
    let delivery = if config.slack.enabled {
        let token = config
            .slack
            .token
            .as_deref()
            .ok_or_else(|| BotError::configuration("--slack-token must be specified"))?;
        slack = match config.slack.api_base {
            Some(ref base) => SlackTransport::with_base_url(token, base.as_str())?,
            None => SlackTransport::new(token)?,
        };
        Delivery::Chat(&slack)
    } else {
        Delivery::Console(&mut stdout)
    };

    let mut router = Router::new(delivery, user_map.as_ref()).with_identity(config.slack.identity());
    run_checks(config, account.iam(), account.storage(), &mut router, Utc::now())
}

/// Execute the enabled checks in the order MFA, public S3, IAM keys. The first
/// error stops the run; messages already sent stay sent.
pub fn run_checks(
    config: &Config,
    iam: &dyn IamReader,
    storage: &dyn StorageReader,
    router: &mut Router<'_>,
    now: DateTime<Utc>,
) -> Result<AuditSummary> {
    let mut summary = AuditSummary::new();
    // Both IAM checks read the same listing; fetch it at most once.
    let mut principals: Option<Vec<Principal>> = None;

    if config.mfa.enabled {
        info!("Running the MFA check");
        let report = if config.mfa.credential_report {
            fetch_credential_report(config, iam)?
        } else {
            None
        };
        let listed = list_principals_once(&mut principals, iam)?;
        let set = MfaCheck::new().evaluate(iam, listed, report.as_ref())?;
        router.dispatch(&set, &config.mfa.route())?;
        summary.record(&set);
    }

    if config.public_s3.enabled {
        info!("Running the public S3 check");
        let set = PublicBucketCheck::new().run(storage)?;
        router.dispatch(&set, &config.public_s3.route())?;
        summary.record(&set);
    }

    if config.iam_keys.enabled {
        info!("Running the IAM access key check");
        let thresholds = config.iam_keys.thresholds().ok_or_else(|| {
            BotError::configuration(
                "--iam-keys-warn-age and --iam-keys-expire-age must be specified if you're using --iam-keys",
            )
        })?;
        let listed = list_principals_once(&mut principals, iam)?;
        let set = KeyAgeCheck::new(thresholds).evaluate(listed, now);
        router.dispatch(&set, &config.iam_keys.route())?;
        summary.record(&set);
    }

    for totals in summary.checks() {
        debug!(
            check = %totals.check,
            subjects = totals.subjects,
            findings = totals.findings,
            "Check totals"
        );
    }
    if summary.passed() {
        info!(checks = summary.checks_run(), "Audit finished with no findings");
    } else {
        info!(
            checks = summary.checks_run(),
            findings = summary.total_findings(),
            "Audit finished with findings"
        );
    }
    Ok(summary)
}

fn list_principals_once<'a>(
    cache: &'a mut Option<Vec<Principal>>,
    iam: &dyn IamReader,
) -> Result<&'a [Principal]> {
    if cache.is_none() {
        debug!("Listing IAM users");
        *cache = Some(iam.list_principals()?);
    }
    Ok(cache.as_deref().unwrap_or_default())
}

fn fetch_credential_report(config: &Config, iam: &dyn IamReader) -> Result<Option<CredentialReport>> {
    match config.mfa.poller().poll(iam)? {
        ReportPoll::Ready(report) if report.is_empty() => {
            debug!("Credential report lists no users; looking up login profiles per user");
            Ok(None)
        }
        ReportPoll::Ready(report) => Ok(Some(report)),
        ReportPoll::Unavailable => {
            debug!("No credential report available; looking up login profiles per user");
            Ok(None)
        }
        ReportPoll::TimedOut { attempts } => Err(BotError::ReportTimedOut { attempts }),
    }
}
