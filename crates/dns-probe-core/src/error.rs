//! Error types for the DNS probe
//!
//! This module defines all error types used throughout the crate.
//!
//! Errors fall into two groups:
//! - **Fatal**: configuration and metric registration errors, raised while
//!   constructing a [`Prober`](crate::Prober). The daemon refuses to start.
//! - **Per-probe**: timeouts, socket failures and malformed responses. These
//!   are absorbed by the probe loop, counted and logged, never propagated.

use std::fmt;
use thiserror::Error;

/// Result type alias for probe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Phase of a single DNS exchange, used to report which step timed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    /// Resolving and connecting to the server
    Dial,
    /// Sending the query
    Write,
    /// Waiting for the response
    Read,
}

impl fmt::Display for ExchangePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangePhase::Dial => f.write_str("dial"),
            ExchangePhase::Write => f.write_str("write"),
            ExchangePhase::Read => f.write_str("read"),
        }
    }
}

/// Core error type for the DNS probe
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metric instrument construction or registration errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Target cannot be encoded as a DNS name
    #[error("Invalid probe target: {0}")]
    InvalidTarget(String),

    /// An exchange phase exceeded the configured timeout
    #[error("{phase} timeout talking to {server}")]
    Timeout {
        /// Phase that timed out
        phase: ExchangePhase,
        /// Server address
        server: String,
    },

    /// Socket-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Malformed or unexpected DNS response
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid target error
    pub fn invalid_target(msg: impl Into<String>) -> Self {
        Self::InvalidTarget(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(phase: ExchangePhase, server: impl Into<String>) -> Self {
        Self::Timeout {
            phase,
            server: server.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

impl From<hickory_proto::error::ProtoError> for Error {
    fn from(err: hickory_proto::error::ProtoError) -> Self {
        Self::Protocol(err.to_string())
    }
}
