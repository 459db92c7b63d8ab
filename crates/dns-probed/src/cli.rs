//! Command-line and environment configuration

use anyhow::Result;
use clap::{Parser, ValueEnum};
use dns_probe_core::ProbeConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// Prometheus exporter for dns resolution requests
#[derive(Debug, Parser)]
#[command(name = "dns-resolve-exporter", version)]
#[command(about = "Prometheus exporter for dns resolution requests")]
pub struct Cli {
    /// DNS server address, host or host:port
    #[arg(short = 's', long, env = "DNS_RESOLVE_EXPORTER_DNSServer")]
    pub server: String,

    /// Probe interval
    #[arg(
        short = 'i',
        long,
        default_value = "5s",
        value_parser = humantime::parse_duration,
        env = "DNS_RESOLVE_EXPORTER_PROBE_INTERVAL"
    )]
    pub interval: Duration,

    /// Probe timeout, must not exceed the interval
    #[arg(
        long,
        default_value = "5s",
        value_parser = humantime::parse_duration,
        env = "DNS_RESOLVE_EXPORTER_PROBE_TIMEOUT"
    )]
    pub timeout: Duration,

    /// Time the HTTP server keeps serving after a shutdown signal
    #[arg(
        long,
        default_value = "1s",
        value_parser = humantime::parse_duration,
        env = "DNS_RESOLVE_EXPORTER_SHUTDOWN_GRACE_PERIOD"
    )]
    pub shutdown_grace_period: Duration,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, default_value = "info", env = "DNS_RESOLVE_EXPORTER_LOG_LEVEL")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json, env = "DNS_RESOLVE_EXPORTER_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Address of the metrics and health endpoints
    #[arg(long, default_value = "0.0.0.0:8080", env = "DNS_RESOLVE_EXPORTER_LISTEN")]
    pub listen: SocketAddr,

    /// Hostnames to probe
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Text,
}

impl Cli {
    /// The probe configuration, validated
    pub fn probe_config(&self) -> Result<ProbeConfig> {
        let config = ProbeConfig::new(self.server.clone())
            .with_targets(self.targets.iter().cloned())
            .with_interval(self.interval)
            .with_timeout(self.timeout);
        config.validate()?;
        Ok(config)
    }

    /// The configured log level
    pub fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "failed to parse log level '{}'. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}
