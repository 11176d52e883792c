mod types;

pub use types::{CheckKind, Finding, FindingDetail, FindingKind, FindingSet, SubjectFindings};
