use std::time::Duration;

use crate::error::{Error, Result};

/// Base URL of the integration backend when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Spacing of periodic refresh cycles.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

pub const ENV_API_URL: &str = "DRYWALL_API_URL";
pub const ENV_POLL_SECS: &str = "DRYWALL_POLL_SECS";
pub const ENV_TIMEOUT_SECS: &str = "DRYWALL_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Scheme, host and port of the backend. Resource paths are appended.
    pub base_url: String,

    /// Spacing of periodic refresh cycles. Must be non-zero.
    pub poll_interval: Duration,

    /// Per-request timeout. `None` leaves the HTTP client's default.
    pub request_timeout: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: POLL_INTERVAL,
            request_timeout: None,
        }
    }
}

impl MonitorConfig {
    /// Defaults, overridden by `DRYWALL_API_URL`, `DRYWALL_POLL_SECS` and
    /// `DRYWALL_TIMEOUT_SECS` when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            validate_base_url(&url)?;
            config.base_url = url;
        }

        if let Some(secs) = lookup(ENV_POLL_SECS) {
            let secs = parse_secs(ENV_POLL_SECS, &secs)?;
            if secs == 0 {
                return Err(Error::Config(format!("{ENV_POLL_SECS} must be non-zero")));
            }
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs = parse_secs(ENV_TIMEOUT_SECS, &secs)?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn validate_base_url(url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| Error::Config(format!("{ENV_API_URL}={url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "{ENV_API_URL}={url}: unsupported scheme {other}"
        ))),
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{key}={value}: {e}")))
}
