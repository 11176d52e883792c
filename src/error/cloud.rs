//! Errors from the cloud read backends.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloudError {
    /// The looked-up entity does not exist. For login profiles this is an
    /// expected outcome, not a failure.
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("{operation} failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },
}

impl CloudError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn request(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Request {
            operation,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
