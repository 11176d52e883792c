//! Aggregation layer.
//!
//! Each check hands its raw findings to a [`FindingCollector`], which groups
//! them by subject into an immutable [`FindingSet`]. The checks never see
//! each other's results; [`AuditSummary`] only records totals for the run.

pub mod collector;
pub mod summary;

pub use crate::findings::FindingSet;

pub use collector::FindingCollector;
pub use summary::{AuditSummary, CheckTotals};
