//! DNS resolution prober
//!
//! The Prober is responsible for:
//! - Owning the exchange bound to one resolver and one timeout
//! - Running one fixed-interval loop per probe target
//! - Recording every attempt, failure and round trip into its metrics
//!
//! ## Probe flow
//!
//! ```text
//!   tick ──► request_total{target} += 1
//!             │
//!             ▼
//!        DnsExchange::exchange(A? target)
//!             │
//!      ┌──────┴───────┐
//!      ▼              ▼
//!   Err(e)          Ok(response)
//!      │              │
//!      ▼              ▼
//!  request_error    request_duration
//!  _total += 1      {rcode,target}.observe(rtt)
//!      │              │
//!      ▼              ▼
//!  "probe failed"   "probed"
//! ```
//!
//! ## Timing
//!
//! The first probe happens one interval after the loop starts. When a probe
//! outlasts the interval the missed ticks are skipped, never queued, so at
//! most one probe per target is in flight.
//!
//! ## Cancellation
//!
//! The loop waits on the timer and the cancellation token together, polling
//! the token first. Once the token fires no new probe starts. A probe already in flight is allowed to
//! finish its own timeout-bounded exchange before the loop returns.

use crate::config::{ProbeConfig, normalize_target};
use crate::error::Result;
use crate::exchange::{UdpExchange, build_query, rcode_name};
use crate::metrics::ProberMetrics;
use crate::traits::DnsExchange;
use prometheus::Registry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Result of a successful probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Symbolic response code, e.g. `NOERROR`
    pub rcode: String,
    /// Measured round-trip time
    pub rtt: Duration,
}

/// DNS resolution prober
///
/// One Prober is shared (behind an `Arc`) by all per-target loops. It holds
/// no mutable state of its own; the metric instruments are safe for
/// concurrent use.
pub struct Prober {
    exchange: Box<dyn DnsExchange>,
    interval: Duration,
    metrics: ProberMetrics,
}

impl Prober {
    /// Create a prober that talks UDP to `server`
    ///
    /// `server` gets the default DNS port when it has none. `timeout` bounds
    /// the dial, write and read phases of each exchange. When `registry` is
    /// `None` the instruments are still recorded into, just never exposed.
    ///
    /// # Errors
    ///
    /// [`Error::Metrics`](crate::Error::Metrics) if the instruments are
    /// already registered in `registry`.
    pub fn new(
        server: &str,
        timeout: Duration,
        interval: Duration,
        registry: Option<&Registry>,
    ) -> Result<Self> {
        Self::with_exchange(
            Box::new(UdpExchange::new(server, timeout)),
            interval,
            registry,
        )
    }

    /// Create a prober around any [`DnsExchange`]
    ///
    /// The constant `server` label is taken from [`DnsExchange::server`].
    pub fn with_exchange(
        exchange: Box<dyn DnsExchange>,
        interval: Duration,
        registry: Option<&Registry>,
    ) -> Result<Self> {
        let metrics = ProberMetrics::new(exchange.server())?;

        if let Some(registry) = registry {
            metrics.register(registry)?;
        }

        Ok(Self {
            exchange,
            interval,
            metrics,
        })
    }

    /// Validate `config` and create a UDP prober from it
    pub fn from_config(config: &ProbeConfig, registry: Option<&Registry>) -> Result<Self> {
        config.validate()?;
        Self::new(&config.server, config.timeout, config.interval, registry)
    }

    /// The normalized `host:port` this prober queries
    pub fn server(&self) -> &str {
        self.exchange.server()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn metrics(&self) -> &ProberMetrics {
        &self.metrics
    }

    /// Probe `target` every interval until `shutdown` is cancelled
    ///
    /// Probe failures are logged and counted; they never end the loop.
    pub async fn run(&self, shutdown: CancellationToken, target: &str) {
        let target = normalize_target(target);

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(target = %target, interval = ?self.interval, "probe loop started");

        loop {
            // A tick left ready by a slow probe must not outrun cancellation
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!(target = %target, "probe loop stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }

            match self.probe_once(&target).await {
                Ok(outcome) => {
                    info!(rcode = %outcome.rcode, rtt = ?outcome.rtt, target = %target, "probed");
                }
                Err(e) => {
                    error!(target = %target, error = %e, "probe failed");
                }
            }
        }
    }

    /// Perform exactly one probe of `target`
    ///
    /// `request_total` is incremented before the exchange. A failed exchange
    /// increments `request_error_total`; a successful one, whatever its
    /// response code, adds one `request_duration` sample.
    pub async fn probe_once(&self, target: &str) -> Result<ProbeOutcome> {
        let target = normalize_target(target);

        self.metrics.observe_request(&target);

        let exchanged = match build_query(&target) {
            Ok(query) => self.exchange.exchange(&query).await,
            Err(e) => Err(e),
        };

        let exchanged = match exchanged {
            Ok(exchanged) => exchanged,
            Err(e) => {
                self.metrics.observe_error(&target);
                return Err(e);
            }
        };

        let rcode = rcode_name(exchanged.response.response_code());
        self.metrics
            .observe_duration(&rcode, &target, exchanged.rtt.as_secs_f64());

        Ok(ProbeOutcome {
            rcode: rcode.into_owned(),
            rtt: exchanged.rtt,
        })
    }

    /// Launch one loop per target on the current runtime
    ///
    /// The returned set completes once every loop has observed `shutdown`.
    pub fn spawn_all<I, S>(self: Arc<Self>, shutdown: CancellationToken, targets: I) -> JoinSet<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut loops = JoinSet::new();

        for target in targets {
            let target: String = target.into();
            let prober = Arc::clone(&self);
            let shutdown = shutdown.clone();
            loops.spawn(async move { prober.run(shutdown, &target).await });
        }

        loops
    }
}
