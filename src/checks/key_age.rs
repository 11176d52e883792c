//! Access key age check.
//!
//! Every active key is classified against two thresholds: keys at or past
//! the expire age are expired, keys between the warn age and the expire age
//! are flagged with the whole days they have left.

use crate::aggregator::FindingCollector;
use crate::findings::{CheckKind, Finding, FindingSet};
use crate::types::{Credential, Principal};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Largest age, in days, accepted for either threshold.
pub const MAX_KEY_AGE_DAYS: i64 = 36_500;

/// Warn and expire ages, in days. Validated by the configuration layer so
/// that `0 < warn_days < expire_days <= MAX_KEY_AGE_DAYS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAgeThresholds {
    pub warn_days: i64,
    pub expire_days: i64,
}

impl KeyAgeThresholds {
    pub fn new(warn_days: i64, expire_days: i64) -> Self {
        Self {
            warn_days,
            expire_days,
        }
    }

    fn warn_age(&self) -> Duration {
        days_saturating(self.warn_days)
    }

    fn expire_age(&self) -> Duration {
        days_saturating(self.expire_days)
    }
}

/// Day counts past what chrono can represent clamp to the extreme duration.
fn days_saturating(days: i64) -> Duration {
    Duration::try_days(days).unwrap_or(if days < 0 { Duration::MIN } else { Duration::MAX })
}

#[derive(Debug, Clone, Copy)]
pub struct KeyAgeCheck {
    thresholds: KeyAgeThresholds,
}

impl KeyAgeCheck {
    pub fn new(thresholds: KeyAgeThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify a single key, returning at most one finding.
    pub fn classify(
        &self,
        principal: &str,
        key: &Credential,
        now: DateTime<Utc>,
    ) -> Option<Finding> {
        if !key.is_active() {
            return None;
        }

        let age = key.age_at(now);
        debug!(key = %key.id, age_days = age.num_days(), "Checking access key");

        if age >= self.thresholds.expire_age() {
            debug!(key = %key.id, "Key is expired");
            Some(Finding::key_expired(principal, &key.id))
        } else if age >= self.thresholds.warn_age() {
            let remaining = self.thresholds.expire_age() - age;
            debug!(key = %key.id, days_left = remaining.num_days(), "Key is approaching expiration");
            Some(Finding::key_expiring(principal, &key.id, remaining.num_days()))
        } else {
            None
        }
    }

    /// Evaluate already-listed principals.
    pub fn evaluate(&self, principals: &[Principal], now: DateTime<Utc>) -> FindingSet {
        let mut collector = FindingCollector::new(CheckKind::IamKeys);
        for principal in principals {
            debug!(user = %principal.id, "Checking the access keys");
            collector.add_all(
                principal
                    .active_credentials()
                    .filter_map(|key| self.classify(&principal.id, key, now)),
            );
        }
        collector.into_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::{FindingDetail, FindingKind};
    use crate::types::CredentialStatus;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn key(id: &str, age: Duration, status: CredentialStatus) -> Credential {
        Credential::new(id, now() - age, status)
    }

    fn check() -> KeyAgeCheck {
        KeyAgeCheck::new(KeyAgeThresholds::new(80, 90))
    }

    #[test]
    fn test_young_key_has_no_finding() {
        let k = key("AKIA1", Duration::days(79), CredentialStatus::Active);
        assert_eq!(check().classify("alice", &k, now()), None);
    }

    #[test]
    fn test_key_at_warn_age_warns_with_remaining_days() {
        let k = key("AKIA1", Duration::days(80), CredentialStatus::Active);
        let finding = check().classify("alice", &k, now()).unwrap();
        assert_eq!(finding.kind(), FindingKind::KeyWarn);
        assert_eq!(
            finding.detail,
            FindingDetail::KeyExpiring {
                key_id: "AKIA1".to_string(),
                days_remaining: 10
            }
        );
    }

    #[test]
    fn test_remaining_days_round_down() {
        // 85.5 days old leaves 4.5 days, reported as 4.
        let k = key(
            "AKIA1",
            Duration::days(85) + Duration::hours(12),
            CredentialStatus::Active,
        );
        let finding = check().classify("alice", &k, now()).unwrap();
        assert!(matches!(
            finding.detail,
            FindingDetail::KeyExpiring { days_remaining: 4, .. }
        ));
    }

    #[test]
    fn test_key_just_under_expire_age_still_warns() {
        let k = key(
            "AKIA1",
            Duration::days(90) - Duration::seconds(1),
            CredentialStatus::Active,
        );
        let finding = check().classify("alice", &k, now()).unwrap();
        assert!(matches!(
            finding.detail,
            FindingDetail::KeyExpiring { days_remaining: 0, .. }
        ));
    }

    #[test]
    fn test_key_at_expire_age_is_expired() {
        let k = key("AKIA1", Duration::days(90), CredentialStatus::Active);
        let finding = check().classify("alice", &k, now()).unwrap();
        assert_eq!(finding.kind(), FindingKind::KeyExpired);
        assert_eq!(finding.subject, "alice");
    }

    #[test]
    fn test_inactive_keys_never_produce_findings() {
        for days in [0, 80, 85, 90, 400] {
            let k = key("AKIA1", Duration::days(days), CredentialStatus::Inactive);
            assert_eq!(check().classify("alice", &k, now()), None, "age {days}");
        }
    }

    #[test]
    fn test_evaluate_groups_keys_by_principal() {
        let principals = vec![
            Principal::new("alice")
                .with_credential(key("AKIA1", Duration::days(100), CredentialStatus::Active))
                .with_credential(key("AKIA2", Duration::days(85), CredentialStatus::Active))
                .with_credential(key("AKIA3", Duration::days(1), CredentialStatus::Active)),
            Principal::new("bob")
                .with_credential(key("AKIA4", Duration::days(200), CredentialStatus::Inactive)),
            Principal::new("carol")
                .with_credential(key("AKIA5", Duration::days(81), CredentialStatus::Active)),
        ];

        let set = check().evaluate(&principals, now());
        assert_eq!(set.check(), CheckKind::IamKeys);
        assert_eq!(set.subjects().collect::<Vec<_>>(), vec!["alice", "carol"]);
        assert_eq!(set.get("alice").unwrap().findings.len(), 2);
        assert_eq!(set.finding_count(), 3);
    }

    #[test]
    fn test_huge_expire_age_does_not_overflow() {
        let check = KeyAgeCheck::new(KeyAgeThresholds::new(1, i64::MAX));
        let k = key("AKIA1", Duration::days(5), CredentialStatus::Active);

        let finding = check.classify("alice", &k, now()).unwrap();
        assert_eq!(finding.kind(), FindingKind::KeyWarn);
    }

    #[test]
    fn test_future_creation_date_counts_as_new() {
        let k = Credential::new("AKIA1", now() + Duration::days(5), CredentialStatus::Active);
        assert_eq!(check().classify("alice", &k, now()), None);
    }
}
