//! Per-run totals across the executed checks.

use crate::findings::{CheckKind, FindingSet};
use serde::Serialize;

/// Totals for one executed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckTotals {
    pub check: CheckKind,
    pub subjects: usize,
    pub findings: usize,
}

/// Record of which checks ran and what they found.
#[derive(Debug, Default, Serialize)]
pub struct AuditSummary {
    checks: Vec<CheckTotals>,
}

impl AuditSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed check.
    pub fn record(&mut self, set: &FindingSet) {
        self.checks.push(CheckTotals {
            check: set.check(),
            subjects: set.subject_count(),
            findings: set.finding_count(),
        });
    }

    pub fn checks(&self) -> &[CheckTotals] {
        &self.checks
    }

    pub fn checks_run(&self) -> usize {
        self.checks.len()
    }

    pub fn total_findings(&self) -> usize {
        self.checks.iter().map(|c| c.findings).sum()
    }

    /// True when every executed check came back clean.
    pub fn passed(&self) -> bool {
        self.total_findings() == 0
    }
}
