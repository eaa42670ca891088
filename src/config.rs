//! Configuration file for the `timerlog` binary
//!
//! ```toml
//! # timerlog.toml
//! timer_dir = "/var/tmp/timers"
//! format = "json"
//! ```
//!
//! Every field is optional; command-line flags take precedence.

use crate::cli::OutputFormat;
use crate::error::{Result, TimerError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings loaded from a TOML file
///
/// # Example
/// ```
/// use timerlog::cli::OutputFormat;
/// use timerlog::config::TimerlogConfig;
///
/// let config = TimerlogConfig::from_toml_str("format = \"json\"").unwrap();
/// assert_eq!(config.format, OutputFormat::Json);
/// assert!(config.timer_dir.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimerlogConfig {
    /// Directory for per-file timers
    pub timer_dir: Option<PathBuf>,

    /// Report output format
    pub format: OutputFormat,
}

impl TimerlogConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| TimerError::Config(e.to_string()))
    }

    /// Load and validate a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| TimerError::io(path, e))?;
        let config = Self::from_toml_str(&contents)?;
        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check that a configured timer directory exists
    pub fn validate(&self) -> Result<()> {
        match &self.timer_dir {
            Some(dir) if !dir.is_dir() => Err(TimerError::InvalidDirectory(dir.clone())),
            _ => Ok(()),
        }
    }
}
