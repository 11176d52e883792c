//! Storage bucket ACL grants.

use serde::{Deserialize, Serialize};

/// Grantee URI of the group containing every anonymous requester.
pub const ALL_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// Grantee URI of the group containing any authenticated AWS account.
pub const AUTHENTICATED_USERS_URI: &str =
    "http://acs.amazonaws.com/groups/global/AuthenticatedUsers";

/// Kind of grantee named by an ACL grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GranteeType {
    CanonicalUser,
    AmazonCustomerByEmail,
    Group,
    #[serde(untagged)]
    Other(String),
}

impl GranteeType {
    pub fn parse(value: &str) -> Self {
        match value {
            "CanonicalUser" => GranteeType::CanonicalUser,
            "AmazonCustomerByEmail" => GranteeType::AmazonCustomerByEmail,
            "Group" => GranteeType::Group,
            other => GranteeType::Other(other.to_string()),
        }
    }
}

/// One grant from a bucket's access control list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketGrant {
    pub bucket: String,
    pub grantee_type: GranteeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grantee_uri: Option<String>,
    pub permission: String,
}

impl BucketGrant {
    /// True when the grant opens the bucket to everyone or to every
    /// authenticated AWS account.
    pub fn is_public(&self) -> bool {
        self.grantee_type == GranteeType::Group
            && matches!(
                self.grantee_uri.as_deref(),
                Some(ALL_USERS_URI) | Some(AUTHENTICATED_USERS_URI)
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(grantee_type: GranteeType, uri: Option<&str>) -> BucketGrant {
        BucketGrant {
            bucket: "assets".to_string(),
            grantee_type,
            grantee_uri: uri.map(str::to_string),
            permission: "READ".to_string(),
        }
    }

    #[test]
    fn test_all_users_group_is_public() {
        assert!(grant(GranteeType::Group, Some(ALL_USERS_URI)).is_public());
    }

    #[test]
    fn test_authenticated_users_group_is_public() {
        assert!(grant(GranteeType::Group, Some(AUTHENTICATED_USERS_URI)).is_public());
    }

    #[test]
    fn test_log_delivery_group_is_not_public() {
        let g = grant(
            GranteeType::Group,
            Some("http://acs.amazonaws.com/groups/s3/LogDelivery"),
        );
        assert!(!g.is_public());
    }

    #[test]
    fn test_group_without_uri_is_not_public() {
        assert!(!grant(GranteeType::Group, None).is_public());
    }

    #[test]
    fn test_canonical_user_with_public_uri_is_not_public() {
        assert!(!grant(GranteeType::CanonicalUser, Some(ALL_USERS_URI)).is_public());
    }

    #[test]
    fn test_grantee_type_parse() {
        assert_eq!(GranteeType::parse("Group"), GranteeType::Group);
        assert_eq!(GranteeType::parse("CanonicalUser"), GranteeType::CanonicalUser);
        assert_eq!(
            GranteeType::parse("Something"),
            GranteeType::Other("Something".to_string())
        );
    }
}
