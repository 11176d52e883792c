use serde::{Deserialize, Serialize};

/// The check that produced a set of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    IamKeys,
    Mfa,
    PublicS3,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::IamKeys => "iam-keys",
            CheckKind::Mfa => "mfa",
            CheckKind::PublicS3 => "public-s3",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    KeyWarn,
    KeyExpired,
    NoMfa,
    PublicBucket,
}

impl FindingKind {
    /// The check this kind of finding belongs to.
    pub fn check(&self) -> CheckKind {
        match self {
            FindingKind::KeyWarn | FindingKind::KeyExpired => CheckKind::IamKeys,
            FindingKind::NoMfa => CheckKind::Mfa,
            FindingKind::PublicBucket => CheckKind::PublicS3,
        }
    }
}

/// Kind-specific payload of a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingDetail {
    KeyExpiring { key_id: String, days_remaining: i64 },
    KeyExpired { key_id: String },
    MfaMissing,
    PublicAccess { permissions: Vec<String> },
}

impl std::fmt::Display for FindingDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingDetail::KeyExpiring {
                key_id,
                days_remaining,
            } => write!(f, "{} (expires in {} days)", key_id, days_remaining),
            FindingDetail::KeyExpired { key_id } => write!(f, "{}", key_id),
            FindingDetail::MfaMissing => write!(f, "no MFA device"),
            FindingDetail::PublicAccess { permissions } => {
                write!(f, "{}", permissions.join(", "))
            }
        }
    }
}

/// One detected policy violation. The kind is derived from the detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Principal id or bucket name.
    pub subject: String,
    pub detail: FindingDetail,
}

impl Finding {
    pub fn key_expiring(
        subject: impl Into<String>,
        key_id: impl Into<String>,
        days_remaining: i64,
    ) -> Self {
        Self {
            subject: subject.into(),
            detail: FindingDetail::KeyExpiring {
                key_id: key_id.into(),
                days_remaining,
            },
        }
    }

    pub fn key_expired(subject: impl Into<String>, key_id: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            detail: FindingDetail::KeyExpired {
                key_id: key_id.into(),
            },
        }
    }

    pub fn no_mfa(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            detail: FindingDetail::MfaMissing,
        }
    }

    pub fn public_bucket(bucket: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            subject: bucket.into(),
            detail: FindingDetail::PublicAccess { permissions },
        }
    }

    pub fn kind(&self) -> FindingKind {
        match self.detail {
            FindingDetail::KeyExpiring { .. } => FindingKind::KeyWarn,
            FindingDetail::KeyExpired { .. } => FindingKind::KeyExpired,
            FindingDetail::MfaMissing => FindingKind::NoMfa,
            FindingDetail::PublicAccess { .. } => FindingKind::PublicBucket,
        }
    }
}

/// All findings one check produced for a single subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectFindings {
    pub subject: String,
    pub findings: Vec<Finding>,
}

impl SubjectFindings {
    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind() == kind)
    }

    pub fn has_kind(&self, kind: FindingKind) -> bool {
        self.of_kind(kind).next().is_some()
    }
}

/// The findings of one check grouped by subject.
///
/// Subjects are unique and kept in the order they were first reported.
/// Built by [`crate::aggregator::FindingCollector`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingSet {
    check: CheckKind,
    groups: Vec<SubjectFindings>,
}

impl FindingSet {
    pub(crate) fn from_groups(check: CheckKind, groups: Vec<SubjectFindings>) -> Self {
        Self { check, groups }
    }

    pub fn empty(check: CheckKind) -> Self {
        Self::from_groups(check, Vec::new())
    }

    pub fn check(&self) -> CheckKind {
        self.check
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of distinct subjects.
    pub fn subject_count(&self) -> usize {
        self.groups.len()
    }

    pub fn finding_count(&self) -> usize {
        self.groups.iter().map(|g| g.findings.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubjectFindings> {
        self.groups.iter()
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.subject.as_str())
    }

    pub fn get(&self, subject: &str) -> Option<&SubjectFindings> {
        self.groups.iter().find(|g| g.subject == subject)
    }

    /// Iterate the subjects that have at least one finding of `kind`.
    pub fn with_kind(&self, kind: FindingKind) -> impl Iterator<Item = &SubjectFindings> {
        self.groups.iter().filter(move |g| g.has_kind(kind))
    }
}

impl<'a> IntoIterator for &'a FindingSet {
    type Item = &'a SubjectFindings;
    type IntoIter = std::slice::Iter<'a, SubjectFindings>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
