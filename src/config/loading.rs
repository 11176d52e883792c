//! Configuration loading functions.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigFormat};
use super::types::Config;

const CONFIG_FILENAMES: &[&str] = &[
    ".aws-security-bot.yaml",
    ".aws-security-bot.yml",
    ".aws-security-bot.json",
    ".aws-security-bot.toml",
];

impl Config {
    /// Read a bot config file; the extension picks the format.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ConfigFormat::from_extension)
            .ok_or_else(|| ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            })?;

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed: Result<Self, String> = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        })
    }

    /// Find a config file in `dir`.
    ///
    /// Search order:
    /// 1. `.aws-security-bot.yaml`
    /// 2. `.aws-security-bot.yml`
    /// 3. `.aws-security-bot.json`
    /// 4. `.aws-security-bot.toml`
    pub fn find_in(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILENAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Load the explicit config file if given, otherwise the first config file
    /// found in `dir`, otherwise the defaults.
    ///
    /// Unlike a missing file, a file that exists but cannot be parsed is an
    /// error.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match explicit.map(Path::to_path_buf).or_else(|| Self::find_in(dir)) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }
}
