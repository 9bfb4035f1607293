//! Configuration loading for the `tolk` binary.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.tolk/config.toml` (user)
//! 3. `/etc/tolk/config.toml` (system)
//!
//! When none of these exist the built-in defaults are used; every key is
//! optional.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::providers::{MyMemoryClient, RetryConfig};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::{Result, TolkBuilder, TolkError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Cache behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    /// Language used when neither `--lang` nor a saved language is present.
    #[serde(default)]
    pub default_language: Option<String>,
    /// Cooldown after a rate-limit response, in seconds (default: 3600).
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Maximum simultaneous outbound requests (default: 16, 0 = unbounded).
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            default_language: None,
            cooldown_secs: default_cooldown_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

fn default_cooldown_secs() -> u64 {
    3600
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent() -> usize {
    16
}

/// Remote provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// MyMemory base URL (default: https://api.mymemory.translated.net).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Contact email forwarded to MyMemory for a larger quota.
    #[serde(default)]
    pub email: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            email: None,
        }
    }
}

fn default_base_url() -> String {
    crate::providers::mymemory::DEFAULT_BASE_URL.to_string()
}

/// Where persisted state lives.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub kind: StorageKind,
    /// Directory for the file store (default: `~/.cache/tolk`).
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Persistence backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Memory,
}

/// Retry settings for transient provider failures.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// Attempts including the first (default: 1, i.e. no retry).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        RetryConfig::new()
            .max_attempts(settings.max_attempts)
            .initial_delay(Duration::from_millis(settings.initial_delay_ms))
            .max_delay(Duration::from_millis(settings.max_delay_ms))
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.tolk/config.toml`
    /// 3. `/etc/tolk/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TolkError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            TolkError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, if any exists.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(TolkError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".tolk").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/tolk/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Open the configured persistence backend.
    pub fn open_store(&self) -> Arc<dyn KeyValueStore> {
        match self.storage.kind {
            StorageKind::Memory => Arc::new(MemoryStore::new()),
            StorageKind::File => match &self.storage.dir {
                Some(dir) => Arc::new(FileStore::new(dir)),
                None => Arc::new(FileStore::default_location()),
            },
        }
    }

    /// Apply provider, timing and retry settings to a builder.
    ///
    /// Language and store are left to the caller.
    pub fn apply(&self, builder: TolkBuilder) -> TolkBuilder {
        let mut client = MyMemoryClient::with_base_url(&self.provider.base_url);
        if let Some(email) = &self.provider.email {
            client = client.email(email);
        }

        builder
            .provider(Arc::new(client))
            .cooldown(Duration::from_secs(self.translation.cooldown_secs))
            .request_timeout(Duration::from_secs(self.translation.request_timeout_secs))
            .max_concurrent_requests(self.translation.max_concurrent_requests)
            .retry(RetryConfig::from(&self.retry))
    }
}
