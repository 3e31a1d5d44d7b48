//! Prometheus metrics for the probe endpoints
//!
//! - `event_api_probe_requests_total` (counter) - probe calls by probe and result
//! - `event_api_admin_actions_total` (counter) - admin toggles by action
//! - `event_api_healthy` / `event_api_ready` (gauges) - current flag values

use prometheus::{CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::state::HealthSnapshot;

/// Metrics errors
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Metrics error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, MetricsError>;

/// Probe and admin metrics backed by an owned registry
pub struct ProbeMetrics {
    registry: Registry,
    probe_requests_total: CounterVec,
    admin_actions_total: CounterVec,
    healthy: Gauge,
    ready: Gauge,
}

impl ProbeMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let probe_requests_total = CounterVec::new(
            Opts::new("probe_requests_total", "Total number of probe requests")
                .namespace("event_api"),
            &["probe", "result"],
        )?;

        let admin_actions_total = CounterVec::new(
            Opts::new("admin_actions_total", "Total number of admin probe toggles")
                .namespace("event_api"),
            &["action"],
        )?;

        let healthy = Gauge::with_opts(
            Opts::new("healthy", "Liveness flag (1 = healthy)").namespace("event_api"),
        )?;

        let ready = Gauge::with_opts(
            Opts::new("ready", "Readiness flag (1 = ready)").namespace("event_api"),
        )?;

        registry.register(Box::new(probe_requests_total.clone()))?;
        registry.register(Box::new(admin_actions_total.clone()))?;
        registry.register(Box::new(healthy.clone()))?;
        registry.register(Box::new(ready.clone()))?;

        healthy.set(1.0);
        ready.set(1.0);

        Ok(Self {
            registry,
            probe_requests_total,
            admin_actions_total,
            healthy,
            ready,
        })
    }

    /// Record a probe answer
    pub fn record_probe(&self, probe: &str, passed: bool) {
        let result = if passed { "pass" } else { "fail" };
        self.probe_requests_total
            .with_label_values(&[probe, result])
            .inc();
    }

    /// Record an admin toggle and mirror the resulting flags
    pub fn record_admin(&self, action: &str, snapshot: &HealthSnapshot) {
        self.admin_actions_total.with_label_values(&[action]).inc();
        self.sync_flags(snapshot);
    }

    pub fn sync_flags(&self, snapshot: &HealthSnapshot) {
        self.healthy.set(if snapshot.healthy { 1.0 } else { 0.0 });
        self.ready.set(if snapshot.ready { 1.0 } else { 0.0 });
    }

    pub fn probe_count(&self, probe: &str, passed: bool) -> u64 {
        let result = if passed { "pass" } else { "fail" };
        self.probe_requests_total
            .with_label_values(&[probe, result])
            .get() as u64
    }

    /// Encode all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ServiceHealthState;

    #[test]
    fn test_record_probe() {
        let metrics = ProbeMetrics::new().unwrap();
        metrics.record_probe("health", true);
        metrics.record_probe("health", true);
        metrics.record_probe("health", false);

        assert_eq!(metrics.probe_count("health", true), 2);
        assert_eq!(metrics.probe_count("health", false), 1);
        assert_eq!(metrics.probe_count("ready", true), 0);
    }

    #[test]
    fn test_admin_syncs_gauges() {
        let metrics = ProbeMetrics::new().unwrap();
        let state = ServiceHealthState::new();

        state.fail();
        metrics.record_admin("fail", &state.snapshot());

        let output = metrics.render().unwrap();
        assert!(output.contains("event_api_healthy 0"));
        assert!(output.contains("event_api_ready 1"));
        assert!(output.contains("event_api_admin_actions_total{action=\"fail\"} 1"));
    }
}
