//! Configuration for the console and the store.
//!
//! Both load from TOML with per-field defaults, so an empty or partial
//! file is valid. Console settings can be overridden from the environment
//! (`SYNM_API_BASE`, `SYNM_DEMO`); CLI flags override both.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::SynmError;
use crate::DEFAULT_PORT;

/// Env var pointing at an explicit console config file
pub const CONFIG_ENV: &str = "SYNM_CONFIG";

/// Env var overriding the store base URL
pub const API_BASE_ENV: &str = "SYNM_API_BASE";

/// Env var enabling demo mode (`1` or `true`)
pub const DEMO_ENV: &str = "SYNM_DEMO";

/// Console (client) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL of the store, without trailing slash
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Fixed credential, no prompting
    #[serde(default)]
    pub demo: bool,

    /// Roster refresh interval
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Where the credential cookie is kept; defaults under the config dir
    #[serde(default)]
    pub cookie_path: Option<PathBuf>,
}

fn default_api_base() -> String {
    format!("http://127.0.0.1:{}", DEFAULT_PORT)
}

fn default_poll_interval() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            demo: false,
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
            cookie_path: None,
        }
    }
}

impl ConsoleConfig {
    /// Load from `$SYNM_CONFIG` or `<config dir>/synm/console.toml`, then
    /// apply environment overrides. A missing file means defaults.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join("synm").join("console.toml")));

        let config = match path {
            Some(p) if p.exists() => Self::load_from_path(&p).unwrap_or_else(|e| {
                warn!("Ignoring unreadable console config: {}", e);
                Self::default()
            }),
            _ => Self::default(),
        };

        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self, SynmError> {
        let content = fs::read_to_string(path)?;
        let config: ConsoleConfig = toml::from_str(&content)
            .map_err(|e| SynmError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded console config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides through a lookup function
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(API_BASE_ENV).filter(|b| !b.trim().is_empty()) {
            self.api_base = base;
        }
        if let Some(flag) = lookup(DEMO_ENV) {
            self.demo = is_truthy(&flag);
        }
        self.api_base = self.api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Cookie jar location: explicit path or `<config dir>/synm/cookies.txt`
    pub fn cookie_path(&self) -> PathBuf {
        self.cookie_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("synm")
                .join("cookies.txt")
        })
    }
}

/// Store (server) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Auto-generated keys are "demo" instead of random
    #[serde(default)]
    pub demo: bool,

    /// File the credential is loaded from and written back to
    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

fn default_bind() -> String {
    format!("127.0.0.1:{}", DEFAULT_PORT)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            demo: false,
            key_file: None,
        }
    }
}

impl StoreConfig {
    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self, SynmError> {
        let content = fs::read_to_string(path)?;
        let config: StoreConfig = toml::from_str(&content)
            .map_err(|e| SynmError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded store config from {}", path.display());
        Ok(config)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
