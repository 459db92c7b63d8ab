// # dns-probe-core
//
// Core library for the DNS resolution probe.
//
// ## Architecture Overview
//
// This library periodically resolves a fixed set of hostnames against one
// resolver and records the outcomes as Prometheus metrics:
// - **DnsExchange**: Trait for one query/response round trip
// - **UdpExchange**: DNS over UDP, bounded by a per-phase timeout
// - **ProberMetrics**: The duration histogram and request/error counters
// - **Prober**: Per-target fixed-interval loops recording into the metrics
//
// ## Design Principles
//
// 1. **Failure Isolation**: A failed probe is counted and logged, the loop goes on
// 2. **No Retries**: Each tick is exactly one attempt
// 3. **Cooperative Shutdown**: Loops observe a shared cancellation token
// 4. **Library-First**: The daemon only wires configuration, HTTP and signals

pub mod traits;
pub mod exchange;
pub mod metrics;
pub mod prober;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsExchange, Exchanged};
pub use exchange::UdpExchange;
pub use metrics::ProberMetrics;
pub use prober::{ProbeOutcome, Prober};
pub use config::{ProbeConfig, normalize_server, normalize_target};
pub use error::{Error, Result};
pub use tokio_util::sync::CancellationToken;
