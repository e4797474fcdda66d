use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{PolicyError, RetryPolicy};

/// Environment variable holding the completion service API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Retry policy parameters (`[retry]` in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Base delay in seconds for exponential backoff (e.g. 1.0).
    pub initial_delay_secs: f64,
    /// Ceiling on any single backoff wait, in seconds.
    pub max_delay_secs: u64,
    /// Add random jitter in `[0, initial_delay)` to each wait.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_jitter() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_secs: 1.0,
            max_delay_secs: 60,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> Result<RetryPolicy, PolicyError> {
        if self.initial_delay_secs.is_nan() || self.initial_delay_secs <= 0.0 {
            return Err(PolicyError::NonPositiveInitialDelay);
        }
        let initial = Duration::try_from_secs_f64(self.initial_delay_secs)
            .map_err(|_| PolicyError::InitialDelayOutOfRange(self.initial_delay_secs))?;
        let policy =
            RetryPolicy::new(self.max_retries, initial, Duration::from_secs(self.max_delay_secs))?;
        Ok(if self.jitter {
            policy
        } else {
            policy.without_jitter()
        })
    }
}

/// Completion service endpoint settings (`[api]` in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub connect_timeout_secs: u64,
    /// Per-attempt timeout; expiry counts as a connectivity failure.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 2000,
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
        }
    }
}

/// Global configuration loaded from `~/.config/tutor/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Optional TOML file with extra fallback topics layered over the built-ins.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl TutorConfig {
    /// Apply `TUTOR_*` environment overrides on top of file values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TUTOR_MAX_RETRIES") {
            self.retry.max_retries = v
                .trim()
                .parse()
                .with_context(|| format!("TUTOR_MAX_RETRIES={:?}", v))?;
        }
        if let Some(v) = lookup("TUTOR_INITIAL_DELAY_SECS") {
            self.retry.initial_delay_secs = v
                .trim()
                .parse()
                .with_context(|| format!("TUTOR_INITIAL_DELAY_SECS={:?}", v))?;
        }
        if let Some(v) = lookup("TUTOR_MODEL") {
            self.api.model = v;
        }
        if let Some(v) = lookup("TUTOR_API_BASE_URL") {
            self.api.base_url = v;
        }
        Ok(())
    }
}

/// API key from the environment, if set and non-empty.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tutor")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
/// Environment overrides are applied afterwards.
pub fn load_or_init() -> Result<TutorConfig> {
    let path = config_path()?;
    let mut cfg = if path.exists() {
        load_from_path(&path)?
    } else {
        let default_cfg = TutorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    };
    cfg.apply_env_overrides()?;
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> Result<TutorConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: TutorConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
