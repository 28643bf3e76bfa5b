//! Runtime configuration.
//!
//! Values come from an optional YAML file and are then overridden by CLI
//! flags (see [`crate::cli`]). Every field has a default, so an absent file
//! or a partial one is fine.
//!
//! ```yaml
//! log_dir: ./logs
//! empty_date_policy: now
//! max_pages: 10
//! request_timeout_secs: 30
//! sheet_name: Articles
//! export_format: xlsx
//! ```

use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ConfigError;

/// How an empty timestamp string is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmptyDatePolicy {
    /// Fail with [`DateFormatError::Empty`](crate::error::DateFormatError::Empty).
    #[default]
    Reject,
    /// Substitute the current time and log a warning.
    Now,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Directory the run's log file is written to.
    pub log_dir: PathBuf,
    pub empty_date_policy: EmptyDatePolicy,
    /// Upper bound on result pages visited in one run.
    pub max_pages: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub sheet_name: String,
    pub export_format: ExportFormat,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            empty_date_policy: EmptyDatePolicy::default(),
            max_pages: 10,
            request_timeout_secs: 30,
            user_agent: format!("Mozilla/5.0 (compatible; news_window/{})", env!("CARGO_PKG_VERSION")),
            sheet_name: "Articles".to_string(),
            export_format: ExportFormat::default(),
        }
    }
}

impl ScraperConfig {
    /// Load the config file at `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("No config file given; using defaults");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
