//! Configuration file handling.
//!
//! This module provides loading and saving of log4scan configuration
//! from a TOML file. Every field has a default, so a missing file or a
//! partial one is fine. Command-line flags override what is loaded here.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/log4scan/config.toml`
//! - macOS: `~/Library/Application Support/log4scan/config.toml`
//! - Windows: `%APPDATA%\log4scan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! batch_size = 20000
//! queue_depth = 16
//! throttle_pause_ms = 50
//! default_format = "text"
//! log_level = "warn"
//! include_dos_range = false
//! exclude = ["/proc", "/sys", "*/node_modules"]
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scanner::{ScanOptions, Throttle, DEFAULT_QUEUE_DEPTH};

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use log4scan::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Batch size: {}", config.batch_size);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of filesystem entries between throttling pauses.
    ///
    /// Default: 20000
    pub batch_size: u64,

    /// Capacity of the queue between the directory walker and the
    /// archive inspector.
    ///
    /// Default: 16
    pub queue_depth: usize,

    /// Length of each throttling pause, in milliseconds.
    ///
    /// Default: 50
    pub throttle_pause_ms: u64,

    /// Output format when no `--format` flag is provided.
    ///
    /// Valid values: "text", "json", "table"
    /// Default: "text"
    pub default_format: String,

    /// Log filter used when `RUST_LOG` is not set.
    ///
    /// Default: "warn"
    pub log_level: String,

    /// Also flag releases affected by CVE-2021-45105.
    ///
    /// Default: false
    pub include_dos_range: bool,

    /// Directory patterns the walker never enters, matched per path
    /// component. A leading `/` anchors at the filesystem root, and `*`
    /// matches within one component, e.g. `"/proc"` or `"*/node_modules"`.
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: Throttle::DEFAULT_BATCH_SIZE,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            throttle_pause_ms: Throttle::DEFAULT_PAUSE.as_millis() as u64,
            default_format: "text".to_string(),
            log_level: "warn".to_string(),
            include_dos_range: false,
            exclude: Vec::new(),
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
    /// Returns an error if the config file exists but cannot be read or
    /// parsed, or if it holds invalid values.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config in {}", path.display()))
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("log4scan")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be greater than zero");
        }
        if self.queue_depth == 0 {
            bail!("queue_depth must be greater than zero");
        }
        Ok(())
    }

    /// Scan options for `root` built from this configuration.
    pub fn scan_options(&self, root: impl Into<PathBuf>) -> ScanOptions {
        let mut options = ScanOptions::new(root).with_exclude(self.exclude.clone());
        options.throttle = Throttle {
            batch_size: self.batch_size,
            pause: Duration::from_millis(self.throttle_pause_ms),
        };
        options.queue_depth = self.queue_depth;
        options
    }
}
