//! Configuration types for the DNS probe
//!
//! This module defines the probe configuration and the normalization rules
//! applied to server addresses and probe targets.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Port used when the server address does not carry one
pub const DEFAULT_DNS_PORT: u16 = 53;

/// Main probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Resolver address, `host` or `host:port`
    pub server: String,

    /// Hostnames to probe, one loop each
    pub targets: Vec<String>,

    /// Period between probes of the same target
    #[serde(default = "default_interval")]
    pub interval: Duration,

    /// Dial, write and read timeout of a single exchange
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl ProbeConfig {
    /// Create a new configuration with defaults
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            targets: Vec::new(),
            interval: default_interval(),
            timeout: default_timeout(),
        }
    }

    /// Set the probe targets
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the probe interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the exchange timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.server.trim().is_empty() {
            return Err(crate::Error::config("dns server address cannot be empty"));
        }

        if self.targets.is_empty() {
            return Err(crate::Error::config("must set probe targets"));
        }

        if self.targets.iter().any(|t| t.trim().is_empty()) {
            return Err(crate::Error::config("probe targets cannot be empty"));
        }

        if self.interval.is_zero() {
            return Err(crate::Error::config("interval must be > 0"));
        }

        if self.timeout > self.interval {
            return Err(crate::Error::config("interval must be larger than timeout"));
        }

        Ok(())
    }
}

fn default_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Append the default DNS port to `server` unless it already has one
///
/// Bare IPv6 literals are bracketed so the result is a valid `host:port`.
pub fn normalize_server(server: &str) -> String {
    let server = server.trim();

    if server.parse::<SocketAddr>().is_ok() {
        return server.to_string();
    }

    if let Ok(ip) = server.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_DNS_PORT).to_string();
    }

    // "[::1]" without a port
    if server.starts_with('[') && server.ends_with(']') {
        return format!("{}:{}", server, DEFAULT_DNS_PORT);
    }

    match server.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
            server.to_string()
        }
        _ => format!("{}:{}", server, DEFAULT_DNS_PORT),
    }
}

/// Make `target` fully qualified by appending the root label
pub fn normalize_target(target: &str) -> String {
    if target.ends_with('.') {
        target.to_string()
    } else {
        format!("{}.", target)
    }
}
