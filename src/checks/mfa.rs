//! Multi-factor authentication compliance check.
//!
//! A principal without any MFA device is only a finding when it can log in
//! interactively; without a login vector MFA is moot.

use super::credential_report::CredentialReport;
use crate::aggregator::FindingCollector;
use crate::cloud::IamReader;
use crate::error::CloudError;
use crate::findings::{CheckKind, Finding, FindingSet};
use crate::types::Principal;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct MfaCheck;

impl MfaCheck {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether a principal can log in interactively.
    ///
    /// Either the listing or the credential report's `password_enabled`
    /// column saying yes is enough. A "no" from one of them is only final
    /// when the other also says no; otherwise the login profile lookup
    /// decides, and a missing profile means "no login".
    fn has_login(
        &self,
        reader: &dyn IamReader,
        principal: &Principal,
        report: Option<&CredentialReport>,
    ) -> Result<bool, CloudError> {
        let listed = principal.has_login;
        let reported = report
            .and_then(|r| r.get(&principal.id))
            .map(|row| row.password_enabled);

        if listed == Some(true) || reported == Some(true) {
            debug!(user = %principal.id, ?listed, ?reported, "User has a login");
            return Ok(true);
        }
        if listed.is_some() && reported.is_some() {
            return Ok(false);
        }

        match reader.get_login_profile(&principal.id) {
            Ok(()) => Ok(true),
            Err(err) if err.is_not_found() => {
                debug!(user = %principal.id, "No login profile");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Evaluate already-listed principals.
    pub fn evaluate(
        &self,
        reader: &dyn IamReader,
        principals: &[Principal],
        report: Option<&CredentialReport>,
    ) -> Result<FindingSet, CloudError> {
        let mut collector = FindingCollector::new(CheckKind::Mfa);
        for principal in principals {
            if principal.mfa_device_count > 0 {
                continue;
            }
            if self.has_login(reader, principal, report)? {
                debug!(user = %principal.id, "User has a login but no MFA device");
                collector.add(Finding::no_mfa(&principal.id));
            }
        }
        Ok(collector.into_set())
    }
}
