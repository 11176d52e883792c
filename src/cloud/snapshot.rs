//! Offline backend serving an inventory captured to a JSON file.
//!
//! ```json
//! {
//!   "principals": [
//!     {
//!       "id": "alice",
//!       "credentials": [
//!         { "id": "AKIA...", "created_at": "2025-01-01T00:00:00Z", "status": "Active" }
//!       ],
//!       "mfa_device_count": 0,
//!       "has_login": true
//!     }
//!   ],
//!   "buckets": [
//!     {
//!       "name": "assets",
//!       "grants": [
//!         { "grantee_type": "Group",
//!           "grantee_uri": "http://acs.amazonaws.com/groups/global/AllUsers",
//!           "permission": "READ" }
//!       ]
//!     }
//!   ],
//!   "credential_report": "user,arn,password_enabled,mfa_active\n..."
//! }
//! ```

use super::{IamReader, ReportState, StorageReader};
use crate::error::CloudError;
use crate::types::{BucketGrant, GranteeType, Principal};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySnapshot {
    pub principals: Vec<Principal>,
    pub buckets: Vec<SnapshotBucket>,
    /// Raw CSV credential report, if one was captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_report: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotBucket {
    pub name: String,
    #[serde(default)]
    pub grants: Vec<SnapshotGrant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotGrant {
    pub grantee_type: GranteeType,
    #[serde(default)]
    pub grantee_uri: Option<String>,
    pub permission: String,
}

impl InventorySnapshot {
    /// Load a snapshot from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, CloudError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CloudError::request(
                "LoadInventory",
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;
        serde_json::from_str(&content).map_err(|e| {
            CloudError::request(
                "LoadInventory",
                format!("failed to parse {}: {}", path.display(), e),
            )
        })
    }
}

/// Serves reads from an [`InventorySnapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotBackend {
    snapshot: InventorySnapshot,
}

impl SnapshotBackend {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_file(path: &Path) -> Result<Self, CloudError> {
        InventorySnapshot::from_file(path).map(Self::new)
    }
}

impl IamReader for SnapshotBackend {
    fn list_principals(&self) -> Result<Vec<Principal>, CloudError> {
        Ok(self.snapshot.principals.clone())
    }

    fn get_login_profile(&self, principal: &str) -> Result<(), CloudError> {
        let has_login = self
            .snapshot
            .principals
            .iter()
            .find(|p| p.id == principal)
            .and_then(|p| p.has_login)
            .unwrap_or(false);

        if has_login {
            Ok(())
        } else {
            Err(CloudError::not_found(format!(
                "login profile for {}",
                principal
            )))
        }
    }

    fn generate_credential_report(&self) -> Result<ReportState, CloudError> {
        Ok(ReportState::Complete)
    }

    fn get_credential_report(&self) -> Result<String, CloudError> {
        self.snapshot
            .credential_report
            .clone()
            .ok_or_else(|| CloudError::not_found("credential report"))
    }
}

impl StorageReader for SnapshotBackend {
    fn list_buckets(&self) -> Result<Vec<String>, CloudError> {
        Ok(self.snapshot.buckets.iter().map(|b| b.name.clone()).collect())
    }

    fn bucket_grants(&self, bucket: &str) -> Result<Vec<BucketGrant>, CloudError> {
        let found = self
            .snapshot
            .buckets
            .iter()
            .find(|b| b.name == bucket)
            .ok_or_else(|| CloudError::request("GetBucketAcl", format!("NoSuchBucket: {}", bucket)))?;

        Ok(found
            .grants
            .iter()
            .map(|g| BucketGrant {
                bucket: found.name.clone(),
                grantee_type: g.grantee_type.clone(),
                grantee_uri: g.grantee_uri.clone(),
                permission: g.permission.clone(),
            })
            .collect())
    }
}
