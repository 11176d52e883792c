//! Public bucket check.

use crate::aggregator::FindingCollector;
use crate::cloud::StorageReader;
use crate::error::CloudError;
use crate::findings::{CheckKind, Finding, FindingSet};
use crate::types::BucketGrant;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct PublicBucketCheck;

impl PublicBucketCheck {
    pub fn new() -> Self {
        Self
    }

    /// Permissions a bucket's ACL grants to the public groups, deduplicated
    /// in the order they appear.
    pub fn public_permissions(grants: &[BucketGrant]) -> Vec<String> {
        let mut permissions: Vec<String> = Vec::new();
        for grant in grants.iter().filter(|g| g.is_public()) {
            if !permissions.contains(&grant.permission) {
                permissions.push(grant.permission.clone());
            }
        }
        permissions
    }

    pub fn run(&self, reader: &dyn StorageReader) -> Result<FindingSet, CloudError> {
        let mut collector = FindingCollector::new(CheckKind::PublicS3);
        for bucket in reader.list_buckets()? {
            debug!(bucket = %bucket, "Checking the ACL");
            let grants = reader.bucket_grants(&bucket)?;
            let permissions = Self::public_permissions(&grants);
            if !permissions.is_empty() {
                debug!(bucket = %bucket, ?permissions, "Bucket is public");
                collector.add(Finding::public_bucket(bucket, permissions));
            }
        }
        Ok(collector.into_set())
    }
}
