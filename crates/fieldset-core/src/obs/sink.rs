//! Metrics sink boundary.
//!
//! This module is the only bridge between execution logic and the global
//! metrics state.

use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug)]
pub enum ExecKind {
    Load,
    Save,
    Delete,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
    },
    ExecFinish {
        kind: ExecKind,
        rows_touched: u64,
    },
    OrphanSweep {
        keys_removed: u64,
    },
    DanglingSelector,
    LayoutSkipped,
    FetchSuperseded,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into global metrics state.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::ExecStart { kind } => match kind {
                ExecKind::Load => m.counters.load_calls = m.counters.load_calls.saturating_add(1),
                ExecKind::Save => m.counters.save_calls = m.counters.save_calls.saturating_add(1),
                ExecKind::Delete => {
                    m.counters.delete_calls = m.counters.delete_calls.saturating_add(1);
                }
            },
            MetricsEvent::ExecFinish { kind, rows_touched } => match kind {
                ExecKind::Load => {
                    m.counters.rows_loaded = m.counters.rows_loaded.saturating_add(rows_touched);
                }
                ExecKind::Save => {
                    m.counters.rows_saved = m.counters.rows_saved.saturating_add(rows_touched);
                }
                ExecKind::Delete => {
                    m.counters.rows_deleted = m.counters.rows_deleted.saturating_add(rows_touched);
                }
            },
            MetricsEvent::OrphanSweep { keys_removed } => {
                m.counters.orphan_keys_removed =
                    m.counters.orphan_keys_removed.saturating_add(keys_removed);
            }
            MetricsEvent::DanglingSelector => {
                m.counters.dangling_selectors = m.counters.dangling_selectors.saturating_add(1);
            }
            MetricsEvent::LayoutSkipped => {
                m.counters.layouts_skipped = m.counters.layouts_skipped.saturating_add(1);
            }
            MetricsEvent::FetchSuperseded => {
                m.counters.fetches_superseded = m.counters.fetches_superseded.saturating_add(1);
            }
        });
    }
}

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    if let Some(sink) = sink {
        sink.record(event);
    } else {
        GlobalMetricsSink.record(event);
    }
}

/// Run a closure with a temporary metrics sink override. The previous sink
/// is restored on all exits, including unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0.take();
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// Span
/// RAII guard that emits start/finish events for one codec execution.
/// Finish accounting happens even on unwind.
///

pub(crate) struct Span {
    kind: ExecKind,
    rows: u64,
}

impl Span {
    #[must_use]
    pub(crate) fn new(kind: ExecKind) -> Self {
        record(MetricsEvent::ExecStart { kind });

        Self { kind, rows: 0 }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            rows_touched: self.rows,
        });
    }
}

///
/// TESTS
///
