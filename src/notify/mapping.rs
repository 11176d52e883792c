//! Map of AWS principals to chat handles, loaded from `users.yml`.
//!
//! ```yaml
//! alice: alice.smith     # direct messages go to @alice.smith
//! bob: "@bob"            # a leading @ on the handle is optional
//! deploy-bot: false      # never message this principal
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the map, relative to the working directory.
pub const DEFAULT_USERS_FILE: &str = "users.yml";

/// How a principal is reached in chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatHandle {
    Mapped(String),
    /// Present in the map with the suppress sentinel.
    Suppressed,
    /// Not present in the map.
    Unmapped,
}

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Failed to read user map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse user map {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Handle(String),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Handle(String),
    Suppressed,
}

impl From<Option<RawEntry>> for Entry {
    fn from(raw: Option<RawEntry>) -> Self {
        match raw {
            Some(RawEntry::Handle(handle)) => {
                let handle = handle.trim().trim_start_matches('@');
                if handle.is_empty() {
                    Entry::Suppressed
                } else {
                    Entry::Handle(handle.to_string())
                }
            }
            // A boolean or an empty value is the "do not message" sentinel.
            Some(RawEntry::Flag(_)) | None => Entry::Suppressed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalChatMap {
    entries: HashMap<String, Entry>,
}

impl PrincipalChatMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the map from a YAML file.
    pub fn load(path: &Path) -> Result<Self, MappingError> {
        let content = fs::read_to_string(path).map_err(|e| MappingError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content).map_err(|e| MappingError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let raw: Option<HashMap<String, Option<RawEntry>>> = serde_yaml::from_str(content)?;
        let entries = raw
            .unwrap_or_default()
            .into_iter()
            .map(|(principal, entry)| (principal, Entry::from(entry)))
            .collect();
        Ok(Self { entries })
    }

    pub fn with_handle(mut self, principal: impl Into<String>, handle: impl Into<String>) -> Self {
        self.entries
            .insert(principal.into(), Entry::Handle(handle.into()));
        self
    }

    pub fn with_suppressed(mut self, principal: impl Into<String>) -> Self {
        self.entries.insert(principal.into(), Entry::Suppressed);
        self
    }

    pub fn resolve(&self, principal: &str) -> ChatHandle {
        match self.entries.get(principal) {
            Some(Entry::Handle(handle)) => ChatHandle::Mapped(handle.clone()),
            Some(Entry::Suppressed) => ChatHandle::Suppressed,
            None => ChatHandle::Unmapped,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
