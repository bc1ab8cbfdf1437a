//! Configuration file handling.
//!
//! This module provides loading and saving of compose-result configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/compose-result/config.toml`
//! - macOS: `~/Library/Application Support/compose-result/config.toml`
//! - Windows: `%APPDATA%\compose-result\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! checksum = "sha256"
//! default_format = "table"
//!
//! [ignore]
//! components = ["org.example.*", "*.debug"]
//! units = ["example-data"]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::result::ChecksumKind;

/// Application configuration.
///
/// It can be loaded from a TOML file or created with default values.
///
/// # Example
///
/// ```no_run
/// use compose_result::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Checksum: {:?}", config.checksum);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Digest used for global component ID checksums.
    ///
    /// Valid values: "sha256", "sha512"
    /// Default: "sha256"
    pub checksum: ChecksumKind,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Ignore list configuration.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Components and units to leave out of the composed results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Component IDs that are not added to results.
    ///
    /// Supports glob patterns (e.g., "org.example.*", "*.debug").
    /// An ignored component is reported as a hint instead.
    pub components: Vec<String>,

    /// Bundle IDs of units that are skipped entirely.
    pub units: Vec<String>,
}

impl IgnoreConfig {
    /// Check if a component should be ignored.
    pub fn should_ignore_component(&self, cid: &str) -> bool {
        self.components.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, cid)
            } else {
                pattern == cid
            }
        })
    }

    /// Check if a unit should be skipped.
    pub fn should_ignore_unit(&self, bundle_id: &str) -> bool {
        self.units.iter().any(|id| id == bundle_id)
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    if !parts[0].is_empty() {
        match remaining.strip_prefix(parts[0]) {
            Some(rest) => remaining = rest,
            None => return false,
        }
    }

    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        match remaining.strip_suffix(last_part) {
            Some(rest) => remaining = rest,
            None => return false,
        }
    }

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checksum: ChecksumKind::default(),
            default_format: "table".to_string(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("compose-result")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
