//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where share links point when nothing else is configured
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:3000/browse.html";

/// Longest share link emitted before falling back to the share key
pub const DEFAULT_MAX_URL_LEN: usize = 8000;

/// Share link settings
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Page that receives the `data` parameter
    pub base_url: Option<String>,

    /// Maximum share link length
    pub max_url_len: Option<usize>,
}

/// RFP configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted collection
    pub data_dir: Option<PathBuf>,

    /// Share link settings
    pub share: ShareConfig,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (applied by the accessors)

        // 2. Global user config (~/.config/rfp/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Environment variables
        if let Ok(dir) = std::env::var("RFP_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }
        if let Ok(url) = std::env::var("RFP_SHARE_BASE_URL") {
            if !url.is_empty() {
                config.share.base_url = Some(url);
            }
        }

        config
    }

    /// Load, then let an explicit `--data-dir` win over everything
    pub fn load_with_data_dir(data_dir: Option<&Path>) -> Self {
        let mut config = Self::load();
        if let Some(dir) = data_dir {
            config.data_dir = Some(dir.to_path_buf());
        }
        config
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rfp")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.share.base_url.is_some() {
            self.share.base_url = other.share.base_url;
        }
        if other.share.max_url_len.is_some() {
            self.share.max_url_len = other.share.max_url_len;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Directory for the persisted collection, falling back to the
    /// platform data directory
    pub fn data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.data_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "rfp")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".rfp"))
    }

    /// Spool directory for opened documents
    pub fn spool_dir(&self) -> PathBuf {
        self.data_dir().join("spool")
    }

    pub fn share_base_url(&self) -> &str {
        self.share
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_SHARE_BASE_URL)
    }

    pub fn max_url_len(&self) -> usize {
        self.share.max_url_len.unwrap_or(DEFAULT_MAX_URL_LEN)
    }
}
