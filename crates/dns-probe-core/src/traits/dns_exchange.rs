// # DNS Exchange Trait
//
// Defines the interface for sending one DNS query to a resolver and
// receiving its response.
//
// ## Implementations
//
// - UDP: `crate::exchange::UdpExchange`
// - Tests: scripted exchanges in `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use dns_probe_core::exchange::{UdpExchange, build_query};
// use dns_probe_core::DnsExchange;
//
// let exchange = UdpExchange::new("1.1.1.1", Duration::from_secs(2));
// let query = build_query("example.com.")?;
// let exchanged = exchange.exchange(&query).await?;
// println!("{:?} in {:?}", exchanged.response.response_code(), exchanged.rtt);
// ```

use async_trait::async_trait;
use hickory_proto::op::Message;
use std::time::Duration;

/// A response together with the measured round-trip time
#[derive(Debug, Clone)]
pub struct Exchanged {
    /// Decoded response message
    pub response: Message,
    /// Time from sending the query to receiving the response
    pub rtt: Duration,
}

/// Trait for DNS exchange implementations
///
/// An exchange is bound to one server and one timeout at construction and
/// is shared read-only by every probe loop.
///
/// # Contract
///
/// - Exactly one round trip per call: no retries, no fallback transport.
/// - Every wait is bounded by the configured timeout.
/// - A response that decodes is `Ok`, whatever its response code.
///   NXDOMAIN and SERVFAIL are results, not errors.
/// - Timeouts, socket failures and undecodable or mismatched responses are
///   all reported as `Err`.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    /// Send `query` and wait for the matching response
    async fn exchange(&self, query: &Message) -> Result<Exchanged, crate::Error>;

    /// The `host:port` this exchange talks to
    fn server(&self) -> &str;
}
