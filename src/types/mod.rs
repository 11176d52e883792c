//! Cloud inventory types consumed by the checks.
//!
//! Everything here is built fresh from the read backends on every run and
//! discarded at exit.

mod bucket;
mod principal;

pub use bucket::{ALL_USERS_URI, AUTHENTICATED_USERS_URI, BucketGrant, GranteeType};
pub use principal::{Credential, CredentialStatus, Principal};
