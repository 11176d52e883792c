//! Finding collector for grouping a check's results by subject.

use crate::findings::{CheckKind, Finding, FindingSet, SubjectFindings};
use std::collections::HashMap;

/// Collects the raw findings of one check.
#[derive(Debug)]
pub struct FindingCollector {
    check: CheckKind,
    groups: Vec<SubjectFindings>,
    index: HashMap<String, usize>,
}

impl FindingCollector {
    /// Create a collector for the given check.
    pub fn new(check: CheckKind) -> Self {
        Self {
            check,
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a finding, appending it to its subject's group.
    pub fn add(&mut self, finding: Finding) {
        debug_assert_eq!(finding.kind().check(), self.check);

        match self.index.get(&finding.subject) {
            Some(&slot) => self.groups[slot].findings.push(finding),
            None => {
                self.index.insert(finding.subject.clone(), self.groups.len());
                self.groups.push(SubjectFindings {
                    subject: finding.subject.clone(),
                    findings: vec![finding],
                });
            }
        }
    }

    /// Add multiple findings.
    pub fn add_all(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.add(finding);
        }
    }

    /// Consume the collector and freeze the grouped findings.
    pub fn into_set(self) -> FindingSet {
        FindingSet::from_groups(self.check, self.groups)
    }
}
