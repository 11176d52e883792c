//! IAM principals and their access keys.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Status of an access key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
    Active,
    Inactive,
}

/// An access key belonging to a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub status: CredentialStatus,
}

impl Credential {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>, status: CredentialStatus) -> Self {
        Self {
            id: id.into(),
            created_at,
            status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CredentialStatus::Active
    }

    /// Age of the key at `now`. Creation times in the future count as zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at).max(Duration::zero())
    }
}

/// An account identity, analogous to an IAM user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub credentials: Vec<Credential>,
    #[serde(default)]
    pub mfa_device_count: usize,
    /// Whether an interactive login exists, when the listing already knows.
    /// `None` means the MFA check has to look it up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_login: Option<bool>,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            credentials: Vec::new(),
            mfa_device_count: 0,
            has_login: None,
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credentials.push(credential);
        self
    }

    pub fn with_mfa_devices(mut self, count: usize) -> Self {
        self.mfa_device_count = count;
        self
    }

    pub fn with_login(mut self, has_login: bool) -> Self {
        self.has_login = Some(has_login);
        self
    }

    pub fn active_credentials(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter().filter(|c| c.is_active())
    }
}
