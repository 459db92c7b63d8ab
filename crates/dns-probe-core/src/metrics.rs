//! Prober metric instruments
//!
//! Three instruments describe probe outcomes:
//!
//! | Name                               | Kind      | Labels           |
//! |------------------------------------|-----------|------------------|
//! | `dns_resolve_request_duration`     | histogram | `rcode`,`target` |
//! | `dns_resolve_request_total`        | counter   | `target`         |
//! | `dns_resolve_request_error_total`  | counter   | `target`         |
//!
//! Every instrument carries a constant `server` label so that probers bound
//! to different resolvers can share one registry.

use crate::error::Result;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

/// Histogram of successful exchange round-trip times, in seconds
pub const REQUEST_DURATION: &str = "dns_resolve_request_duration";
/// Count of attempted queries
pub const REQUEST_TOTAL: &str = "dns_resolve_request_total";
/// Count of exchanges that failed at the transport/protocol level
pub const REQUEST_ERROR_TOTAL: &str = "dns_resolve_request_error_total";

/// The instruments a [`Prober`](crate::Prober) records into
///
/// Cloning is cheap: clones share the underlying metric state.
#[derive(Clone, Debug)]
pub struct ProberMetrics {
    request_duration: HistogramVec,
    request_total: IntCounterVec,
    request_error_total: IntCounterVec,
}

impl ProberMetrics {
    /// Build the instruments, constant-labeled with `server`
    pub fn new(server: &str) -> Result<Self> {
        let request_duration = HistogramVec::new(
            HistogramOpts {
                common_opts: Opts::new(
                    REQUEST_DURATION,
                    "Duration of dns request by rcode and probe target",
                )
                .const_label("server", server),
                buckets: prometheus::DEFAULT_BUCKETS.to_vec(),
            },
            &["rcode", "target"],
        )?;

        let request_total = IntCounterVec::new(
            Opts::new(REQUEST_TOTAL, "Count of dns requests").const_label("server", server),
            &["target"],
        )?;

        let request_error_total = IntCounterVec::new(
            Opts::new(REQUEST_ERROR_TOTAL, "Count of dns request errors")
                .const_label("server", server),
            &["target"],
        )?;

        Ok(Self {
            request_duration,
            request_total,
            request_error_total,
        })
    }

    /// Register all three instruments
    ///
    /// Fails with [`Error::Metrics`](crate::Error::Metrics) if any of them is
    /// already registered; registration happens once per process.
    pub fn register(&self, registry: &Registry) -> Result<()> {
        registry.register(Box::new(self.request_duration.clone()))?;
        registry.register(Box::new(self.request_total.clone()))?;
        registry.register(Box::new(self.request_error_total.clone()))?;
        Ok(())
    }

    /// Count one attempted query
    pub fn observe_request(&self, target: &str) {
        self.request_total.with_label_values(&[target]).inc();
    }

    /// Count one failed exchange
    pub fn observe_error(&self, target: &str) {
        self.request_error_total.with_label_values(&[target]).inc();
    }

    /// Record the round trip of a successful exchange
    pub fn observe_duration(&self, rcode: &str, target: &str, seconds: f64) {
        self.request_duration
            .with_label_values(&[rcode, target])
            .observe(seconds);
    }

    pub fn request_duration(&self) -> &HistogramVec {
        &self.request_duration
    }

    pub fn request_total(&self) -> &IntCounterVec {
        &self.request_total
    }

    pub fn request_error_total(&self) -> &IntCounterVec {
        &self.request_error_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_exposes_server_label() {
        let registry = Registry::new();
        let metrics = ProberMetrics::new("1.1.1.1:53").unwrap();
        metrics.register(&registry).unwrap();

        metrics.observe_request("example.com.");
        metrics.observe_duration("NOERROR", "example.com.", 0.012);

        let families = registry.gather();
        let total = families
            .iter()
            .find(|f| f.get_name() == REQUEST_TOTAL)
            .expect("request total is registered");
        let labels = total.get_metric()[0].get_label();
        assert!(
            labels
                .iter()
                .any(|l| l.get_name() == "server" && l.get_value() == "1.1.1.1:53")
        );
        assert!(
            labels
                .iter()
                .any(|l| l.get_name() == "target" && l.get_value() == "example.com.")
        );
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = Registry::new();
        ProberMetrics::new("1.1.1.1:53")
            .unwrap()
            .register(&registry)
            .unwrap();

        let second = ProberMetrics::new("1.1.1.1:53").unwrap();
        let err = second.register(&registry).unwrap_err();
        assert!(matches!(err, crate::Error::Metrics(_)));
    }

    #[test]
    fn test_counters_are_per_target() {
        let metrics = ProberMetrics::new("1.1.1.1:53").unwrap();
        metrics.observe_request("a.example.");
        metrics.observe_request("a.example.");
        metrics.observe_error("b.example.");

        assert_eq!(metrics.request_total().with_label_values(&["a.example."]).get(), 2);
        assert_eq!(metrics.request_total().with_label_values(&["b.example."]).get(), 0);
        assert_eq!(
            metrics.request_error_total().with_label_values(&["b.example."]).get(),
            1
        );
    }
}
