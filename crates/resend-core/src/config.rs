use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{
    default_retry_on, ErrorKind, PolicyError, RetryPolicy, DEFAULT_ALLOWED_METHODS,
    DEFAULT_STATUS_FORCELIST,
};
use crate::transport::CurlOptions;

/// Retry policy parameters (`[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries (not counting the first attempt).
    pub total: u32,
    /// Exponential backoff factor in seconds (0 = retry immediately).
    pub backoff_factor: f64,
    /// Maximum computed backoff in seconds (does not cap Retry-After).
    pub max_backoff_wait: f64,
    /// Fraction of the backoff window to randomize, 0..=1.
    pub jitter: f64,
    pub respect_retry_after_header: bool,
    /// Retryable status codes; any integer is accepted.
    pub status_forcelist: Vec<u16>,
    /// Retryable methods, case-insensitive.
    pub allowed_methods: Vec<String>,
    /// Retryable error kinds, e.g. "timeout", "network", "connect-timeout".
    pub retry_on_exceptions: Vec<String>,
    /// Optional jitter seed, for reproducible delays.
    pub seed: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            total: 10,
            backoff_factor: 0.0,
            max_backoff_wait: 120.0,
            jitter: 1.0,
            respect_retry_after_header: true,
            status_forcelist: DEFAULT_STATUS_FORCELIST.to_vec(),
            allowed_methods: DEFAULT_ALLOWED_METHODS.iter().map(|m| m.to_string()).collect(),
            retry_on_exceptions: default_retry_on().iter().map(ErrorKind::to_string).collect(),
            seed: None,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> Result<RetryPolicy, PolicyError> {
        let kinds: Vec<ErrorKind> = self
            .retry_on_exceptions
            .iter()
            .filter_map(|name| name.parse::<ErrorKind>().ok())
            .collect();
        for kind in &kinds {
            if let ErrorKind::Custom(name) = kind {
                tracing::warn!(
                    kind = %name,
                    "retry_on_exceptions: unknown error kind, only errors tagged with this exact name will be retried"
                );
            }
        }
        let mut builder = RetryPolicy::builder()
            .total(self.total)
            .backoff_factor(self.backoff_factor)
            .max_backoff_wait(self.max_backoff_wait)
            .jitter(self.jitter)
            .respect_retry_after_header(self.respect_retry_after_header)
            .status_forcelist(self.status_forcelist.iter().copied())
            .allowed_methods(&self.allowed_methods)
            .retry_on(kinds);
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }
}

/// Underlying transport parameters (`[transport]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub connect_timeout_secs: u64,
    /// Whole-request timeout per attempt.
    pub timeout_secs: u64,
    pub follow_redirects: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 30,
            follow_redirects: false,
        }
    }
}

impl TransportConfig {
    pub fn to_curl_options(&self) -> CurlOptions {
        CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            follow_redirects: self.follow_redirects,
        }
    }
}

/// Global configuration loaded from `~/.config/resend/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResendConfig {
    pub retry: RetryConfig,
    pub transport: TransportConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("resend")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ResendConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ResendConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<ResendConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ResendConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
