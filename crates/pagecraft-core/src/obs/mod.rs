//! Observability: in-memory migration counters and the sink boundary.
//!
//! Engine logic never touches `obs::metrics` directly; all
//! instrumentation flows through `MetricsEvent` and `MetricsSink`.

pub(crate) mod metrics;
pub mod sink;

// re-exports
pub use metrics::{MigrationMetrics, metrics_report, metrics_reset};
pub use sink::{MetricsEvent, MetricsSink, record};
