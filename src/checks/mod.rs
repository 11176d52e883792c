//! The three independent audit checks.
//!
//! Each check reads from the cloud backends and produces the
//! [`FindingSet`](crate::findings::FindingSet) for its own domain. A read
//! failure aborts the check and, with it, the run.

pub mod credential_report;
pub mod key_age;
pub mod mfa;
pub mod public_bucket;

pub use credential_report::{CredentialReport, ReportPoll, ReportPoller};
pub use key_age::{KeyAgeCheck, KeyAgeThresholds};
pub use mfa::MfaCheck;
pub use public_bucket::PublicBucketCheck;
