//! CLI for resend.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use resend_core::config::{self, ResendConfig};
use std::path::PathBuf;

use commands::{run_request, show_config};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "resend")]
#[command(about = "resend: HTTP requests that retry transient failures", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/resend/config.toml, created if missing).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Send a request and print the final response.
    Request {
        /// Request URL.
        url: String,

        /// HTTP method.
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Extra header, "Name: value". Repeatable.
        #[arg(short = 'H', long = "header", value_name = "HEADER")]
        headers: Vec<String>,

        /// Request body.
        #[arg(short = 'd', long)]
        data: Option<String>,

        #[command(flatten)]
        retry: RetryArgs,
    },

    /// Shorthand for `request -X GET URL`.
    Get {
        url: String,

        #[command(flatten)]
        retry: RetryArgs,
    },

    /// Print the config file path and the effective configuration.
    Config,
}

/// Per-invocation overrides of the `[retry]` config section.
#[derive(Debug, Clone, Default, Args)]
pub struct RetryArgs {
    /// Maximum number of retries.
    #[arg(long, value_name = "N")]
    pub total: Option<u32>,

    /// Exponential backoff factor in seconds.
    #[arg(long, value_name = "SECS")]
    pub backoff_factor: Option<f64>,

    /// Cap on computed backoff in seconds.
    #[arg(long, value_name = "SECS")]
    pub max_backoff_wait: Option<f64>,

    /// Jitter ratio, 0..=1.
    #[arg(long, value_name = "RATIO")]
    pub jitter: Option<f64>,

    /// Ignore Retry-After headers.
    #[arg(long)]
    pub no_retry_after: bool,

    /// Retryable status code (replaces the configured list). Repeatable.
    #[arg(long = "status", value_name = "CODE")]
    pub status_forcelist: Vec<u16>,

    /// Retryable method (replaces the configured list). Repeatable.
    #[arg(long = "retry-method", value_name = "METHOD")]
    pub allowed_methods: Vec<String>,

    /// Use the async driver instead of the blocking one.
    #[arg(long = "async")]
    pub use_async: bool,
}

impl RetryArgs {
    /// Apply the overrides on top of the loaded config.
    pub fn apply(&self, cfg: &mut ResendConfig) {
        let retry = &mut cfg.retry;
        if let Some(total) = self.total {
            retry.total = total;
        }
        if let Some(factor) = self.backoff_factor {
            retry.backoff_factor = factor;
        }
        if let Some(max) = self.max_backoff_wait {
            retry.max_backoff_wait = max;
        }
        if let Some(jitter) = self.jitter {
            retry.jitter = jitter;
        }
        if self.no_retry_after {
            retry.respect_retry_after_header = false;
        }
        if !self.status_forcelist.is_empty() {
            retry.status_forcelist = self.status_forcelist.clone();
        }
        if !self.allowed_methods.is_empty() {
            retry.allowed_methods = self.allowed_methods.clone();
        }
    }
}

impl Cli {
    fn load_config(&self) -> Result<(Option<PathBuf>, ResendConfig)> {
        match &self.config {
            Some(path) => Ok((Some(path.clone()), config::load_from_path(path)?)),
            None => {
                let cfg = config::load_or_init()?;
                Ok((config::config_path().ok(), cfg))
            }
        }
    }

    pub async fn run(self) -> Result<()> {
        let (path, mut cfg) = self.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Request {
                url,
                method,
                headers,
                data,
                retry,
            } => {
                retry.apply(&mut cfg);
                run_request(&cfg, &method, &url, &headers, data, retry.use_async).await?;
            }
            CliCommand::Get { url, retry } => {
                retry.apply(&mut cfg);
                run_request(&cfg, "GET", &url, &[], None, retry.use_async).await?;
            }
            CliCommand::Config => show_config(path.as_deref(), &cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
