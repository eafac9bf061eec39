use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;
use tracing::info;

use crate::error::{RelayError, Result};

pub const ENV_WEBHOOK_URL: &str = "ZAPIER_WEBHOOK_URL";
pub const ENV_MEMORY_BASE_URL: &str = "MEMORY_AGENT_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "RELAY_UPSTREAM_TIMEOUT_SECS";
pub const ENV_BIND_ADDR: &str = "RELAY_BIND_ADDR";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Where the relay listens and where it forwards to.
///
/// Loaded once at start-up and handed to [`crate::Relay::new`]. Nothing reads the
/// environment after that.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub webhook_url: Url,
    /// Stored without a trailing slash, `/store` and `/retrieve` get appended.
    pub memory_base_url: String,
    pub upstream_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl RelayConfig {
    /// Builds a config for the two downstream URLs with every other knob at its default.
    pub fn new(webhook_url: &str, memory_base_url: &str) -> Result<Self> {
        Ok(Self {
            webhook_url: parse_url(ENV_WEBHOOK_URL, webhook_url)?,
            memory_base_url: normalize_base(memory_base_url)?,
            upstream_timeout: DEFAULT_TIMEOUT,
            bind_addr: parse_bind_addr(DEFAULT_BIND_ADDR)?,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    // Reads the process environment (and a .env file, if there is one)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RelayConfig::from_env`] but with the variables supplied by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| RelayError::Config(format!("{key} must be set")))
        };

        let webhook_url = required(ENV_WEBHOOK_URL)?;
        let memory_base_url = required(ENV_MEMORY_BASE_URL)?;

        let upstream_timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    RelayError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"))
                })?;
                if secs == 0 {
                    return Err(RelayError::Config(format!("{ENV_TIMEOUT_SECS} must be greater than zero")));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        let bind_addr = parse_bind_addr(
            lookup(ENV_BIND_ADDR).as_deref().unwrap_or(DEFAULT_BIND_ADDR),
        )?;

        let config = Self {
            webhook_url: parse_url(ENV_WEBHOOK_URL, &webhook_url)?,
            memory_base_url: normalize_base(&memory_base_url)?,
            upstream_timeout,
            bind_addr,
        };

        info!(
            memory_base_url = %config.memory_base_url,
            timeout_secs = config.upstream_timeout.as_secs(),
            "Relay configuration loaded"
        );
        Ok(config)
    }

    pub fn memory_store_url(&self) -> String {
        format!("{}/store", self.memory_base_url)
    }

    pub fn memory_retrieve_url(&self) -> String {
        format!("{}/retrieve", self.memory_base_url)
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| RelayError::Config(format!("{key} is not a valid URL ('{raw}'): {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RelayError::Config(format!(
            "{key} must be an http(s) URL, got scheme '{other}'"
        ))),
    }
}

fn normalize_base(raw: &str) -> Result<String> {
    let url = parse_url(ENV_MEMORY_BASE_URL, raw)?;
    // Route paths get appended, a query or fragment would swallow them
    if url.query().is_some() || url.fragment().is_some() {
        return Err(RelayError::Config(format!(
            "{ENV_MEMORY_BASE_URL} must not carry a query or fragment, got '{raw}'"
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr> {
    raw.trim()
        .parse()
        .map_err(|e| RelayError::Config(format!("{ENV_BIND_ADDR} '{raw}' is not a socket address: {e}")))
}
