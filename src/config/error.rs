//! Errors raised while loading the bot's config file.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Formats a config file can be written in, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Format for a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
            Self::Toml => "TOML",
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read bot config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} bot config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: ConfigFormat,
        message: String,
    },

    #[error("Bot config {path} must end in .yaml, .yml, .json or .toml")]
    UnsupportedFormat { path: PathBuf },
}
