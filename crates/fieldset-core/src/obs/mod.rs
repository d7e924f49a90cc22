//! Observability: runtime telemetry (counters) and sink abstractions.
//!
//! Codec and resolver logic never touch metrics state directly; all
//! instrumentation flows through `MetricsEvent` and `MetricsSink`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventReport, OpCounters};
pub use sink::{ExecKind, MetricsEvent, MetricsSink, with_metrics_sink};

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}
