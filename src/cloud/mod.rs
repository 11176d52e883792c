//! Read-only access to the cloud account under audit.
//!
//! The checks only ever see these traits. [`SnapshotBackend`] serves an
//! inventory captured to a JSON file; `AwsBackend` (feature `aws`) talks to
//! IAM and S3 directly.

#[cfg(feature = "aws")]
mod aws;
mod snapshot;

#[cfg(feature = "aws")]
pub use aws::AwsBackend;
pub use snapshot::{InventorySnapshot, SnapshotBackend};

use crate::error::CloudError;
use crate::types::{BucketGrant, Principal};
use serde::{Deserialize, Serialize};

/// Generation state of the asynchronously built credential report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportState {
    Started,
    InProgress,
    Complete,
}

impl ReportState {
    pub fn is_complete(&self) -> bool {
        matches!(self, ReportState::Complete)
    }
}

/// Identity and credential reads.
pub trait IamReader {
    /// List every principal with its access keys and MFA device count.
    fn list_principals(&self) -> Result<Vec<Principal>, CloudError>;

    /// Check whether the principal can log in interactively.
    ///
    /// Returns [`CloudError::NotFound`] when the principal has no login
    /// profile, which callers treat as an ordinary answer.
    fn get_login_profile(&self, principal: &str) -> Result<(), CloudError>;

    /// Request generation of the credential report and return its state.
    fn generate_credential_report(&self) -> Result<ReportState, CloudError>;

    /// Fetch the generated credential report as CSV text.
    ///
    /// Returns [`CloudError::NotFound`] when no report is available.
    fn get_credential_report(&self) -> Result<String, CloudError>;
}

/// Storage bucket reads.
pub trait StorageReader {
    fn list_buckets(&self) -> Result<Vec<String>, CloudError>;

    fn bucket_grants(&self, bucket: &str) -> Result<Vec<BucketGrant>, CloudError>;
}
