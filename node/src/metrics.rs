//! Prometheus metrics for the masternode manager.
//!
//! Every status line the heartbeat emits has a counter or gauge here. The
//! [`MasternodeMetrics`] struct owns a dedicated [`Registry`] that an
//! embedding node can encode into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Central collection of all masternode-level Prometheus metrics.
pub struct MasternodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Pings signed and accepted by the transaction pool.
    pub pings_sent: IntCounter,
    /// Ping ticks skipped, by reason.
    pub ticks_skipped: IntCounterVec,
    /// Ping ticks abandoned on a collaborator error.
    pub ping_failures: IntCounter,
    /// Join notifications received.
    pub joins_seen: IntCounter,
    /// Quit notifications received.
    pub quits_seen: IntCounter,
    /// Clock-drift checks completed.
    pub drift_checks: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// 1 while the local node is a registered masternode.
    pub is_masternode: IntGauge,
    /// 1 while the chain is syncing.
    pub is_syncing: IntGauge,
    /// Last observed clock offset from network time, in milliseconds.
    pub clock_offset_ms: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall time of one ping tick, in milliseconds.
    pub ping_tick_ms: Histogram,
}

impl MasternodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let pings_sent = register_int_counter_with_registry!(
            Opts::new("vigil_pings_sent_total", "Liveness pings submitted"),
            registry
        )
        .expect("failed to register pings_sent counter");

        let ticks_skipped = register_int_counter_vec_with_registry!(
            Opts::new("vigil_ping_ticks_skipped_total", "Ping ticks skipped by reason"),
            &["reason"],
            registry
        )
        .expect("failed to register ticks_skipped counter");

        let ping_failures = register_int_counter_with_registry!(
            Opts::new(
                "vigil_ping_failures_total",
                "Ping ticks abandoned on a collaborator error"
            ),
            registry
        )
        .expect("failed to register ping_failures counter");

        let joins_seen = register_int_counter_with_registry!(
            Opts::new("vigil_join_events_total", "Masternode join notifications"),
            registry
        )
        .expect("failed to register joins_seen counter");

        let quits_seen = register_int_counter_with_registry!(
            Opts::new("vigil_quit_events_total", "Masternode quit notifications"),
            registry
        )
        .expect("failed to register quits_seen counter");

        let drift_checks = register_int_counter_with_registry!(
            Opts::new("vigil_drift_checks_total", "Clock-drift checks completed"),
            registry
        )
        .expect("failed to register drift_checks counter");

        let is_masternode = register_int_gauge_with_registry!(
            Opts::new("vigil_is_masternode", "1 while registered as a masternode"),
            registry
        )
        .expect("failed to register is_masternode gauge");

        let is_syncing = register_int_gauge_with_registry!(
            Opts::new("vigil_is_syncing", "1 while the chain is syncing"),
            registry
        )
        .expect("failed to register is_syncing gauge");

        let clock_offset_ms = register_int_gauge_with_registry!(
            Opts::new(
                "vigil_clock_offset_ms",
                "Last observed offset from network time in milliseconds"
            ),
            registry
        )
        .expect("failed to register clock_offset_ms gauge");

        // 1 ms → ~16 s
        let ping_tick_ms = register_histogram_with_registry!(
            HistogramOpts::new("vigil_ping_tick_ms", "Ping tick duration in milliseconds")
                .buckets(prometheus::exponential_buckets(1.0, 2.0, 15).expect("valid buckets")),
            registry
        )
        .expect("failed to register ping_tick_ms histogram");

        Self {
            registry,
            pings_sent,
            ticks_skipped,
            ping_failures,
            joins_seen,
            quits_seen,
            drift_checks,
            is_masternode,
            is_syncing,
            clock_offset_ms,
            ping_tick_ms,
        }
    }

    /// Count a skipped tick under `reason`.
    pub fn skipped(&self, reason: &str) {
        self.ticks_skipped.with_label_values(&[reason]).inc();
    }

    /// Skipped ticks counted under `reason` so far.
    pub fn skipped_count(&self, reason: &str) -> u64 {
        self.ticks_skipped.with_label_values(&[reason]).get()
    }

    /// Encode every metric in the Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Default for MasternodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}
