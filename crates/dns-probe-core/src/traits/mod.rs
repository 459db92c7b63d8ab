//! Core traits for the DNS probe
//!
//! - [`DnsExchange`]: Perform one DNS query/response round trip

pub mod dns_exchange;

pub use dns_exchange::{DnsExchange, Exchanged};
