// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::{fetch::urls, period::Period};

/// Run settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Primary location, with `{year}` and `{month}` placeholders.
    pub current_url_template: String,
    /// Fallback location tried when the primary fails.
    pub archive_url_template: String,
    /// Oldest snapshot the publisher has; earlier requests are dropped.
    pub earliest_period: Period,
    pub max_concurrent_downloads: usize,
    pub request_timeout_secs: u64,
    /// Fail instead of falling back to the latest layout when a period has none.
    pub strict_variants: bool,
    /// Layout registry JSON to use instead of the built-in one.
    pub registry_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            current_url_template: urls::CURRENT_URL_TEMPLATE.to_string(),
            archive_url_template: urls::ARCHIVE_URL_TEMPLATE.to_string(),
            earliest_period: Period {
                year: 2015,
                month: 7,
            },
            max_concurrent_downloads: 3,
            request_timeout_secs: 120,
            strict_variants: false,
            registry_path: None,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("parsing {:?}", path))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
