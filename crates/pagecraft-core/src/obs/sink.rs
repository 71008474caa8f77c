//! Metrics sink boundary.
//!
//! The walker and runner emit `MetricsEvent`s through `record`; by
//! default they land in the thread-local counters. Tests (or embedders)
//! can interpose their own sink for the duration of a closure.

use crate::obs::metrics;
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    RunStarted { from_version: u32, to_version: u32 },
    RunCompleted,
    UnitApplied { index: u32 },
    NodeVisited,
    NodeReplaced,
    NodeDeleted,
    ZoneSpliced,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
///
/// Default sink writing into the thread-local metrics state.
///

struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state(|state| match event {
            MetricsEvent::RunStarted { .. } => state.runs_started += 1,
            MetricsEvent::RunCompleted => state.runs_completed += 1,
            MetricsEvent::UnitApplied { .. } => state.units_applied += 1,
            MetricsEvent::NodeVisited => state.nodes_visited += 1,
            MetricsEvent::NodeReplaced => state.nodes_replaced += 1,
            MetricsEvent::NodeDeleted => state.nodes_deleted += 1,
            MetricsEvent::ZoneSpliced => state.zones_spliced += 1,
        });
    }
}

/// Emit an event to the active sink.
pub fn record(event: MetricsEvent) {
    let recorded = SINK_OVERRIDE.with(|cell| {
        if let Some(ptr) = *cell.borrow() {
            // Pointer is only installed by `with_sink`, which keeps the
            // sink alive for the whole scope.
            unsafe { (*ptr).record(event) };
            true
        } else {
            false
        }
    });

    if !recorded {
        GlobalMetricsSink.record(event);
    }
}

/// Run `f` with `sink` receiving every event emitted on this thread.
/// Overrides nest: on exit the previous override is restored.
pub fn with_sink<R>(sink: &dyn MetricsSink, f: impl FnOnce() -> R) -> R {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // Preconditions:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` always restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists the pointer.
    //
    // Aliasing:
    // - We erase lifetime to a raw pointer, but still only expose shared access.
    // - No mutable alias to the same sink is introduced by this conversion.
    //
    // What would break this:
    // - Any async/deferred use of `sink_ptr` beyond this scope.
    // - Any path that bypasses Guard restoration.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
