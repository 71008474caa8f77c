use serde::{Deserialize, Serialize};
use std::cell::RefCell;

///
/// MigrationMetrics
///
/// Ephemeral, in-memory counters for migration runs. Thread-local: the
/// engine is single-threaded by design, so each thread observes only its
/// own runs.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MigrationMetrics {
    pub runs_started: u64,
    pub runs_completed: u64,
    pub units_applied: u64,
    pub nodes_visited: u64,
    pub nodes_replaced: u64,
    pub nodes_deleted: u64,
    pub zones_spliced: u64,
}

thread_local! {
    static STATE: RefCell<MigrationMetrics> = RefCell::new(MigrationMetrics::default());
}

pub(crate) fn with_state<R>(f: impl FnOnce(&mut MigrationMetrics) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

/// Point-in-time copy of the counters.
#[must_use]
pub fn metrics_report() -> MigrationMetrics {
    with_state(|state| state.clone())
}

/// Reset all counters to zero.
pub fn metrics_reset() {
    with_state(|state| *state = MigrationMetrics::default());
}
