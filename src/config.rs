//! Client configuration.
//!
//! Resolution order, lowest to highest priority:
//! 1. Built-in defaults (`localhost:26532`, 30s call timeout)
//! 2. Environment: `ETB_HOST`, `ETB_PORT`, `ETB_NAME`, `ETB_TIMEOUT_SECS`
//! 3. Explicit overrides from the caller (the CLI flags)

use std::time::Duration;

use url::Url;

use crate::error::EtbError;

/// Port the ETB daemon listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 26532;

/// Default timeout for every call except `query_wait`.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach an ETB server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtbConfig {
    pub host: String,
    pub port: u16,
    /// Optional path segment, used when the ETB sits behind a proxy that
    /// routes by name (`http://host:port/name`).
    pub name: Option<String>,
    /// Timeout applied to ordinary calls.
    pub call_timeout: Duration,
}

impl Default for EtbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            name: None,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}

impl EtbConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Defaults overlaid with the `ETB_*` environment variables.
    pub fn from_env() -> Result<Self, EtbError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EtbConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EtbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("ETB_HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup("ETB_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| EtbError::Config(format!("Invalid ETB_PORT value: {}", port)))?;
        }
        if let Some(name) = lookup("ETB_NAME").filter(|n| !n.trim().is_empty()) {
            config.name = Some(name.trim().to_string());
        }
        if let Some(secs) = lookup("ETB_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                EtbError::Config(format!("Invalid ETB_TIMEOUT_SECS value: {}", secs))
            })?;
            config.call_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// The XML-RPC endpoint, `http://host:port[/name]`.
    pub fn url(&self) -> Result<Url, EtbError> {
        let base = format!("http://{}:{}", self.host, self.port);
        let mut url = Url::parse(&base)
            .map_err(|e| EtbError::Config(format!("Invalid ETB address {}: {}", base, e)))?;
        if let Some(name) = &self.name {
            url.path_segments_mut()
                .map_err(|_| EtbError::Config(format!("Cannot add a path to {}", base)))?
                .pop_if_empty()
                .push(name);
        }
        Ok(url)
    }
}
