//! Message texts for broadcasts, direct messages and fallback notices.

use crate::findings::{CheckKind, Finding, FindingKind, FindingSet, SubjectFindings};

const MFA_GUIDE: &str = "http://docs.aws.amazon.com/IAM/latest/UserGuide/id_credentials_mfa_enable_virtual.html";
const MFA_GUIDE_SECTION: &str = "Enable a Virtual MFA Device for an IAM User (AWS Management Console)";
const KEY_ROTATION_GUIDE: &str = "http://docs.aws.amazon.com/IAM/latest/UserGuide/id_credentials_access-keys.html#Using_RotateAccessKey";
const KEY_ROTATION_SECTION: &str =
    "To rotate access keys without interrupting your applications (console)";

/// Name and icon the bot posts under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub name: String,
    pub icon: String,
}

impl Default for BotIdentity {
    fn default() -> Self {
        Self {
            name: "AWS Security Bot".to_string(),
            icon: ":robot_face:".to_string(),
        }
    }
}

fn code_block(lines: &[String]) -> String {
    format!("```{}```", lines.join("\n"))
}

fn details(findings: &[&Finding]) -> String {
    findings
        .iter()
        .map(|f| f.detail.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One `subject: detail` line per subject having findings of `kind`.
fn subject_lines(set: &FindingSet, kind: FindingKind) -> Vec<String> {
    set.with_kind(kind)
        .map(|group| {
            let findings: Vec<_> = group.of_kind(kind).collect();
            format!("{}: {}", group.subject, details(&findings))
        })
        .collect()
}

/// Confirmation that a check ran and found nothing.
pub fn all_clear(check: CheckKind) -> String {
    match check {
        CheckKind::IamKeys => "No IAM access keys are expired or expiring soon. Yay!".to_string(),
        CheckKind::Mfa => "All AWS users have enabled multi factor authentication. Yay!".to_string(),
        CheckKind::PublicS3 => "No S3 buckets have public permissions. Yay!".to_string(),
    }
}

/// Channel summary of a non-empty finding set.
pub fn broadcast(set: &FindingSet) -> String {
    match set.check() {
        CheckKind::IamKeys => {
            let mut parts = Vec::new();
            let expiring = subject_lines(set, FindingKind::KeyWarn);
            if !expiring.is_empty() {
                parts.push(format!(
                    "The following IAM access keys expire soon:\n{}\nThey should be deactivated and replaced ASAP.",
                    code_block(&expiring)
                ));
            }
            let expired = subject_lines(set, FindingKind::KeyExpired);
            if !expired.is_empty() {
                parts.push(format!(
                    "The following IAM access keys are expired:\n{}\nThey should be deactivated and replaced immediately.",
                    code_block(&expired)
                ));
            }
            parts.join("\n\n")
        }
        CheckKind::Mfa => format!(
            "The following AWS users have not enabled multi factor authentication:\n{}\nThey should each visit {} and perform the steps in the section titled: `{}`",
            code_block(&subject_lines(set, FindingKind::NoMfa)),
            MFA_GUIDE,
            MFA_GUIDE_SECTION
        ),
        CheckKind::PublicS3 => format!(
            "The following S3 buckets are public:\n{}\nYou should adjust their permissions immediately.",
            code_block(&subject_lines(set, FindingKind::PublicBucket))
        ),
    }
}

/// Direct message to a principal about its own findings only. Expired and
/// expiring keys of the same principal are merged into one message.
///
/// `None` for checks whose subjects are not principals; buckets have nobody
/// to message.
pub fn direct(check: CheckKind, group: &SubjectFindings, identity: &BotIdentity) -> Option<String> {
    let greeting = format!("Hi, it's me, your friendly {}!", identity.name);
    match check {
        CheckKind::IamKeys => {
            let mut parts = vec![greeting];
            let expired: Vec<String> = group
                .of_kind(FindingKind::KeyExpired)
                .map(|f| f.detail.to_string())
                .collect();
            if !expired.is_empty() {
                parts.push(format!(
                    "You have the following IAM access key(s) that have expired. You must deactivate them immediately.\n{}",
                    code_block(&expired)
                ));
            }
            let expiring: Vec<String> = group
                .of_kind(FindingKind::KeyWarn)
                .map(|f| f.detail.to_string())
                .collect();
            if !expiring.is_empty() {
                parts.push(format!(
                    "You have the following IAM access key(s) that are expiring soon. You must deactivate them before their stated expiration date.\n{}",
                    code_block(&expiring)
                ));
            }
            parts.push(format!(
                "For instructions on deactivating your access keys and replacing them with new ones, please visit {} and perform the steps in the section titled: `{}`",
                KEY_ROTATION_GUIDE, KEY_ROTATION_SECTION
            ));
            Some(parts.join("\n\n"))
        }
        CheckKind::Mfa => Some(format!(
            "{} It looks like your AWS user ({}) doesn't have MFA (i.e. two-factor authentication) enabled. This is an important security feature that you should enable, so please visit {} and perform the steps in the section titled: `{}`",
            greeting, group.subject, MFA_GUIDE, MFA_GUIDE_SECTION
        )),
        CheckKind::PublicS3 => None,
    }
}

/// Channel notice for a principal that has findings but no chat handle.
pub fn unmapped(check: CheckKind, subject: &str) -> String {
    format!(
        "Couldn't find AWS user `{}` in the Slack user map, so they were not messaged directly about the {} check. Please add them to the user map.",
        subject, check
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::FindingCollector;

    fn key_set() -> FindingSet {
        let mut collector = FindingCollector::new(CheckKind::IamKeys);
        collector.add(Finding::key_expiring("alice", "AKIA1", 5));
        collector.add(Finding::key_expired("bob", "AKIA2"));
        collector.add(Finding::key_expired("alice", "AKIA3"));
        collector.add(Finding::key_expiring("alice", "AKIA4", 2));
        collector.into_set()
    }

    #[test]
    fn test_key_broadcast_sections() {
        let text = broadcast(&key_set());
        assert!(text.starts_with("The following IAM access keys expire soon:\n```alice: AKIA1 (expires in 5 days), AKIA4 (expires in 2 days)```"));
        assert!(text.contains("The following IAM access keys are expired:\n```alice: AKIA3\nbob: AKIA2```"));
    }

    #[test]
    fn test_key_broadcast_without_expiring_section() {
        let mut collector = FindingCollector::new(CheckKind::IamKeys);
        collector.add(Finding::key_expired("bob", "AKIA2"));
        let text = broadcast(&collector.into_set());
        assert!(!text.contains("expire soon"));
        assert!(text.starts_with("The following IAM access keys are expired:"));
    }

    #[test]
    fn test_key_direct_message_merges_kinds() {
        let set = key_set();
        let text = direct(CheckKind::IamKeys, set.get("alice").unwrap(), &BotIdentity::default()).unwrap();

        assert!(text.starts_with("Hi, it's me, your friendly AWS Security Bot!"));
        assert!(text.contains("have expired. You must deactivate them immediately.\n```AKIA3```"));
        assert!(text.contains("```AKIA1 (expires in 5 days)\nAKIA4 (expires in 2 days)```"));
        assert!(text.contains(KEY_ROTATION_GUIDE));
        assert!(!text.contains("AKIA2"));
    }

    #[test]
    fn test_mfa_texts() {
        let mut collector = FindingCollector::new(CheckKind::Mfa);
        collector.add(Finding::no_mfa("alice"));
        let set = collector.into_set();

        let text = broadcast(&set);
        assert!(text.contains("```alice: no MFA device```"));
        assert!(text.contains(MFA_GUIDE));

        let dm = direct(CheckKind::Mfa, set.get("alice").unwrap(), &BotIdentity::default()).unwrap();
        assert!(dm.contains("your AWS user (alice)"));
    }

    #[test]
    fn test_bucket_broadcast() {
        let mut collector = FindingCollector::new(CheckKind::PublicS3);
        collector.add(Finding::public_bucket(
            "website",
            vec!["READ".to_string(), "WRITE".to_string()],
        ));
        let text = broadcast(&collector.into_set());
        assert_eq!(
            text,
            "The following S3 buckets are public:\n```website: READ, WRITE```\nYou should adjust their permissions immediately."
        );
    }

    #[test]
    fn test_buckets_get_no_direct_message() {
        let mut collector = FindingCollector::new(CheckKind::PublicS3);
        collector.add(Finding::public_bucket("website", vec!["READ".to_string()]));
        let set = collector.into_set();
        assert_eq!(
            direct(CheckKind::PublicS3, set.get("website").unwrap(), &BotIdentity::default()),
            None
        );
    }

    #[test]
    fn test_all_clear_texts_differ_per_check() {
        assert!(all_clear(CheckKind::Mfa).contains("multi factor"));
        assert!(all_clear(CheckKind::PublicS3).contains("S3"));
        assert!(all_clear(CheckKind::IamKeys).contains("access keys"));
    }

    #[test]
    fn test_unmapped_names_subject() {
        let text = unmapped(CheckKind::IamKeys, "alice");
        assert!(text.contains("`alice`"));
        assert!(text.contains("iam-keys"));
    }

    #[test]
    fn test_custom_identity_in_greeting() {
        let mut collector = FindingCollector::new(CheckKind::Mfa);
        collector.add(Finding::no_mfa("alice"));
        let set = collector.into_set();
        let identity = BotIdentity {
            name: "Audit Bot".to_string(),
            icon: ":lock:".to_string(),
        };
        let dm = direct(CheckKind::Mfa, set.get("alice").unwrap(), &identity).unwrap();
        assert!(dm.starts_with("Hi, it's me, your friendly Audit Bot!"));
    }
}
