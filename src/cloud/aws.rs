//! AWS backend using the official IAM and S3 SDKs.
//!
//! Credentials and region come from the standard provider chain. The SDK is
//! async, so the backend owns a current-thread runtime and blocks on every
//! call; the audit itself stays sequential.

use super::{IamReader, ReportState, StorageReader};
use crate::error::CloudError;
use crate::types::{BucketGrant, Credential, CredentialStatus, GranteeType, Principal};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::Region;
use aws_sdk_iam::error::DisplayErrorContext;
use aws_sdk_iam::types::{ReportStateType, StatusType};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use tokio::runtime::Runtime;
use tracing::debug;

/// S3 answers for buckets with no location constraint from this region.
const DEFAULT_S3_REGION: &str = "us-east-1";

pub struct AwsBackend {
    runtime: Runtime,
    sdk_config: SdkConfig,
    iam: aws_sdk_iam::Client,
    s3: aws_sdk_s3::Client,
    /// Per-region S3 clients, since ACL reads must go to the bucket's region.
    regional_s3: RefCell<HashMap<String, aws_sdk_s3::Client>>,
}

impl AwsBackend {
    /// Build clients from the environment's default AWS configuration.
    pub fn from_env() -> Result<Self, CloudError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CloudError::request("StartRuntime", e.to_string()))?;

        let sdk_config = runtime.block_on(aws_config::defaults(BehaviorVersion::latest()).load());
        let iam = aws_sdk_iam::Client::new(&sdk_config);
        let s3 = aws_sdk_s3::Client::new(&sdk_config);

        debug!(region = ?sdk_config.region(), "AWS clients initialized");

        Ok(Self {
            runtime,
            sdk_config,
            iam,
            s3,
            regional_s3: RefCell::new(HashMap::new()),
        })
    }

    fn access_keys(&self, user_name: &str) -> Result<Vec<Credential>, CloudError> {
        let keys = self
            .runtime
            .block_on(
                self.iam
                    .list_access_keys()
                    .user_name(user_name)
                    .into_paginator()
                    .items()
                    .send()
                    .collect::<Result<Vec<_>, _>>(),
            )
            .map_err(|e| CloudError::request("ListAccessKeys", DisplayErrorContext(&e).to_string()))?;

        let mut credentials = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(id) = key.access_key_id() else {
                continue;
            };
            let Some(created_at) = key.create_date().and_then(to_utc) else {
                return Err(CloudError::request(
                    "ListAccessKeys",
                    format!("access key {} has no creation date", id),
                ));
            };
            let status = match key.status() {
                Some(StatusType::Active) => CredentialStatus::Active,
                _ => CredentialStatus::Inactive,
            };
            credentials.push(Credential::new(id, created_at, status));
        }
        Ok(credentials)
    }

    fn mfa_device_count(&self, user_name: &str) -> Result<usize, CloudError> {
        let devices = self
            .runtime
            .block_on(
                self.iam
                    .list_mfa_devices()
                    .user_name(user_name)
                    .into_paginator()
                    .items()
                    .send()
                    .collect::<Result<Vec<_>, _>>(),
            )
            .map_err(|e| CloudError::request("ListMFADevices", DisplayErrorContext(&e).to_string()))?;
        Ok(devices.len())
    }

    fn s3_for_bucket(&self, bucket: &str) -> Result<aws_sdk_s3::Client, CloudError> {
        let location = self
            .runtime
            .block_on(self.s3.get_bucket_location().bucket(bucket).send())
            .map_err(|e| {
                CloudError::request(
                    "GetBucketLocation",
                    aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        let region = match location.location_constraint().map(|c| c.as_str()) {
            None | Some("") => DEFAULT_S3_REGION.to_string(),
            Some("EU") => "eu-west-1".to_string(),
            Some(other) => other.to_string(),
        };

        let mut clients = self.regional_s3.borrow_mut();
        let client = clients.entry(region.clone()).or_insert_with(|| {
            let config = aws_sdk_s3::config::Builder::from(&self.sdk_config)
                .region(Region::new(region))
                .build();
            aws_sdk_s3::Client::from_conf(config)
        });
        Ok(client.clone())
    }
}

impl IamReader for AwsBackend {
    fn list_principals(&self) -> Result<Vec<Principal>, CloudError> {
        debug!("Getting the list of IAM users");
        let users = self
            .runtime
            .block_on(
                self.iam
                    .list_users()
                    .into_paginator()
                    .items()
                    .send()
                    .collect::<Result<Vec<_>, _>>(),
            )
            .map_err(|e| CloudError::request("ListUsers", DisplayErrorContext(&e).to_string()))?;

        let mut principals = Vec::with_capacity(users.len());
        for user in users {
            let name = user.user_name();
            debug!(user = %name, "Reading access keys and MFA devices");
            let mut principal = Principal::new(name).with_mfa_devices(self.mfa_device_count(name)?);
            principal.credentials = self.access_keys(name)?;
            principals.push(principal);
        }
        Ok(principals)
    }

    fn get_login_profile(&self, principal: &str) -> Result<(), CloudError> {
        match self
            .runtime
            .block_on(self.iam.get_login_profile().user_name(principal).send())
        {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_entity_exception() {
                    Err(CloudError::not_found(format!(
                        "login profile for {}",
                        principal
                    )))
                } else {
                    Err(CloudError::request(
                        "GetLoginProfile",
                        DisplayErrorContext(&service_err).to_string(),
                    ))
                }
            }
        }
    }

    fn generate_credential_report(&self) -> Result<ReportState, CloudError> {
        let output = self
            .runtime
            .block_on(self.iam.generate_credential_report().send())
            .map_err(|e| {
                CloudError::request(
                    "GenerateCredentialReport",
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        Ok(match output.state() {
            Some(ReportStateType::Complete) => ReportState::Complete,
            Some(ReportStateType::Started) => ReportState::Started,
            _ => ReportState::InProgress,
        })
    }

    fn get_credential_report(&self) -> Result<String, CloudError> {
        let output = match self
            .runtime
            .block_on(self.iam.get_credential_report().send())
        {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_credential_report_not_present_exception() {
                    return Err(CloudError::not_found("credential report"));
                }
                return Err(CloudError::request(
                    "GetCredentialReport",
                    DisplayErrorContext(&service_err).to_string(),
                ));
            }
        };

        let content = output
            .content()
            .ok_or_else(|| CloudError::not_found("credential report content"))?;
        String::from_utf8(content.as_ref().to_vec())
            .map_err(|e| CloudError::request("GetCredentialReport", e.to_string()))
    }
}

impl StorageReader for AwsBackend {
    fn list_buckets(&self) -> Result<Vec<String>, CloudError> {
        debug!("Getting the list of S3 buckets");
        let mut names = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let output = self
                .runtime
                .block_on(
                    self.s3
                        .list_buckets()
                        .set_continuation_token(continuation.take())
                        .send(),
                )
                .map_err(|e| {
                    CloudError::request(
                        "ListBuckets",
                        aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
                    )
                })?;

            names.extend(
                output
                    .buckets()
                    .iter()
                    .filter_map(|b| b.name().map(str::to_string)),
            );

            match output.continuation_token() {
                Some(token) if !token.is_empty() => continuation = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(names)
    }

    fn bucket_grants(&self, bucket: &str) -> Result<Vec<BucketGrant>, CloudError> {
        let client = self.s3_for_bucket(bucket)?;
        let output = self
            .runtime
            .block_on(client.get_bucket_acl().bucket(bucket).send())
            .map_err(|e| {
                CloudError::request(
                    "GetBucketAcl",
                    aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        Ok(output
            .grants()
            .iter()
            .filter_map(|grant| {
                let grantee = grant.grantee()?;
                Some(BucketGrant {
                    bucket: bucket.to_string(),
                    grantee_type: GranteeType::parse(grantee.r#type().as_str()),
                    grantee_uri: grantee.uri().map(str::to_string),
                    permission: grant
                        .permission()
                        .map(|p| p.as_str().to_string())
                        .unwrap_or_default(),
                })
            })
            .collect())
    }
}

fn to_utc(value: &aws_sdk_iam::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}
