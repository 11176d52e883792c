//! IAM credential report: bounded readiness polling and a typed row decoder.

use crate::cloud::IamReader;
use crate::error::CloudError;
use serde::Deserialize;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Columns the MFA check depends on.
const REQUIRED_COLUMNS: [&str; 3] = ["user", "mfa_active", "password_enabled"];

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One decoded row of the credential report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialReportRow {
    pub user: String,
    pub password_enabled: bool,
    pub mfa_active: bool,
}

#[derive(Deserialize)]
struct RawRow {
    user: String,
    password_enabled: String,
    mfa_active: String,
}

/// Cells hold `true`/`false`; anything else (e.g. `not_supported` on the
/// root account row) counts as false.
fn report_bool(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case("true")
}

/// Decoded credential report, keyed by user name.
#[derive(Debug, Clone, Default)]
pub struct CredentialReport {
    rows: HashMap<String, CredentialReportRow>,
}

impl CredentialReport {
    /// Decode the CSV content, failing fast when a required header is absent.
    pub fn parse(content: &str) -> Result<Self, ReportError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ReportError::MissingColumn(column));
            }
        }

        let mut rows = HashMap::new();
        for record in reader.deserialize::<RawRow>() {
            let raw = record?;
            let row = CredentialReportRow {
                password_enabled: report_bool(&raw.password_enabled),
                mfa_active: report_bool(&raw.mfa_active),
                user: raw.user,
            };
            rows.insert(row.user.clone(), row);
        }

        Ok(Self { rows })
    }

    pub fn get(&self, user: &str) -> Option<&CredentialReportRow> {
        self.rows.get(user)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Terminal outcome of waiting for the report.
#[derive(Debug)]
pub enum ReportPoll {
    Ready(CredentialReport),
    /// The account has no report to hand out.
    Unavailable,
    TimedOut { attempts: u32 },
}

/// Requests the credential report and waits for it to become ready.
#[derive(Debug, Clone, Copy)]
pub struct ReportPoller {
    max_attempts: u32,
    interval: Duration,
}

impl Default for ReportPoller {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

impl ReportPoller {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Poll until the report is complete or the attempts run out, then fetch
    /// and decode it.
    pub fn poll(&self, reader: &dyn IamReader) -> Result<ReportPoll, ReportPollError> {
        debug!("Generating IAM credential report");
        let mut attempts = 0;
        loop {
            attempts += 1;
            let state = reader.generate_credential_report()?;
            debug!(attempt = attempts, state = ?state, "Checking for the IAM report");
            if state.is_complete() {
                break;
            }
            if attempts >= self.max_attempts {
                return Ok(ReportPoll::TimedOut { attempts });
            }
            thread::sleep(self.interval);
        }

        match reader.get_credential_report() {
            Ok(content) => {
                let report = CredentialReport::parse(&content)?;
                debug!(rows = report.len(), "Got the IAM report");
                Ok(ReportPoll::Ready(report))
            }
            Err(err) if err.is_not_found() => Ok(ReportPoll::Unavailable),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReportPollError {
    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
