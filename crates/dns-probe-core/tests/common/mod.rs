//! Test doubles and common utilities for probe contract tests
//!
//! - [`ScriptedExchange`]: in-process exchange with a fixed answer and delay
//! - [`MockDnsServer`]: local UDP resolver answering every query with one rcode
//! - [`SilentServer`]: local UDP socket that never answers

#![allow(dead_code)]

use dns_probe_core::error::{Error, ExchangePhase, Result};
use dns_probe_core::traits::{DnsExchange, Exchanged};
use dns_probe_core::{CancellationToken, ProberMetrics};
use hickory_proto::op::{Message, MessageType, ResponseCode};
use prometheus::core::Collector;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;

/// What a [`ScriptedExchange`] answers with
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// A decodable response with this rcode
    Respond(ResponseCode),
    /// A read timeout
    TimeOut,
}

/// Call accounting shared between a test and its boxed exchange
#[derive(Debug, Default)]
pub struct ExchangeStats {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

impl ExchangeStats {
    /// Number of exchanges started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of exchanges that ran to completion
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Highest number of exchanges observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// An exchange that sleeps for `delay`, then follows its script
pub struct ScriptedExchange {
    script: Script,
    delay: Duration,
    stats: Arc<ExchangeStats>,
}

impl ScriptedExchange {
    pub fn new(script: Script, delay: Duration) -> Self {
        Self {
            script,
            delay,
            stats: Arc::new(ExchangeStats::default()),
        }
    }

    /// Handle to the call counters, usable after the exchange is boxed
    pub fn stats(&self) -> Arc<ExchangeStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait::async_trait]
impl DnsExchange for ScriptedExchange {
    async fn exchange(&self, query: &Message) -> Result<Exchanged> {
        self.stats.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.stats.completed.fetch_add(1, Ordering::SeqCst);

        match self.script {
            Script::Respond(rcode) => Ok(Exchanged {
                response: response_to(query, rcode),
                rtt: self.delay,
            }),
            Script::TimeOut => Err(Error::timeout(ExchangePhase::Read, self.server())),
        }
    }

    fn server(&self) -> &str {
        "192.0.2.53:53"
    }
}

/// Build the response a resolver would send for `query`
pub fn response_to(query: &Message, rcode: ResponseCode) -> Message {
    let mut response = query.clone();
    response
        .set_message_type(MessageType::Response)
        .set_recursion_available(true)
        .set_response_code(rcode);
    response
}

/// Local UDP resolver answering every query with a fixed response code
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown: CancellationToken,
}

impl MockDnsServer {
    /// Start the server on an ephemeral loopback port
    pub async fn start(rcode: ResponseCode) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let shutdown = CancellationToken::new();

        let counter = Arc::clone(&queries);
        let stop = shutdown.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        let Ok(query) = Message::from_vec(&buf[..len]) else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);

                        if let Ok(wire) = response_to(&query, rcode).to_vec() {
                            let _ = socket.send_to(&wire, peer).await;
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Number of queries answered so far
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// A bound UDP socket that swallows every query
pub struct SilentServer {
    socket: UdpSocket,
}

impl SilentServer {
    pub async fn start() -> std::io::Result<Self> {
        Ok(Self {
            socket: UdpSocket::bind("127.0.0.1:0").await?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.socket
            .local_addr()
            .expect("bound socket has a local address")
    }
}

/// `dns_resolve_request_total{target}`
pub fn request_total(metrics: &ProberMetrics, target: &str) -> u64 {
    metrics.request_total().with_label_values(&[target]).get()
}

/// `dns_resolve_request_error_total{target}`
pub fn request_errors(metrics: &ProberMetrics, target: &str) -> u64 {
    metrics.request_error_total().with_label_values(&[target]).get()
}

/// Histogram sample count for `target`, summed over every rcode
pub fn duration_samples(metrics: &ProberMetrics, target: &str) -> u64 {
    metrics
        .request_duration()
        .collect()
        .iter()
        .flat_map(|family| family.get_metric())
        .filter(|metric| {
            metric
                .get_label()
                .iter()
                .any(|l| l.get_name() == "target" && l.get_value() == target)
        })
        .map(|metric| metric.get_histogram().get_sample_count())
        .sum()
}

/// Histogram sample count for one `(rcode, target)` pair
pub fn duration_samples_for(metrics: &ProberMetrics, rcode: &str, target: &str) -> u64 {
    metrics
        .request_duration()
        .with_label_values(&[rcode, target])
        .get_sample_count()
}
