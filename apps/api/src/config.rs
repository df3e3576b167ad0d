use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::pipeline::ExecutionMode;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub analysis_service_url: String,
    pub analysis_timeout: Duration,
    pub pipeline_mode: ExecutionMode,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            analysis_service_url: require_env("ANALYSIS_SERVICE_URL")?,
            analysis_timeout: Duration::from_secs(
                optional_env("ANALYSIS_TIMEOUT_SECS", 120)
                    .context("ANALYSIS_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            pipeline_mode: std::env::var("PIPELINE_MODE")
                .unwrap_or_else(|_| "concurrent".to_string())
                .parse::<ExecutionMode>()
                .map_err(|e| anyhow!(e))
                .context("PIPELINE_MODE is invalid")?,
            max_upload_bytes: optional_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            port: optional_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}
