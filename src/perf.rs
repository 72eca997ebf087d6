//! Opt-in timing logs for tree work.
//!
//! Enabled by `SCHEMASCOPE_PERF_TREE`. A numeric value is a threshold in milliseconds:
//! only spans at least that slow are logged.

use std::sync::OnceLock;
use std::time::Instant;

/// `None` when disabled, otherwise the logging threshold in milliseconds.
fn tree_perf_threshold() -> Option<f64> {
    static THRESHOLD: OnceLock<Option<f64>> = OnceLock::new();
    *THRESHOLD.get_or_init(|| {
        let value = std::env::var("SCHEMASCOPE_PERF_TREE").ok()?;
        Some(value.trim().parse::<f64>().unwrap_or(0.0))
    })
}

/// A running measurement; only exists while perf logging is enabled.
#[derive(Debug)]
pub struct TreeSpan {
    label: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl TreeSpan {
    pub fn start(label: &'static str) -> Option<Self> {
        let threshold_ms = tree_perf_threshold()?;
        Some(Self { label, start: Instant::now(), threshold_ms })
    }

    /// Log the span if it ran past the threshold. `details` is only evaluated then.
    pub fn finish(self, details: impl FnOnce() -> String) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        if elapsed_ms < self.threshold_ms {
            return;
        }
        log::info!("[perf-tree] {} ms={elapsed_ms:.3} {}", self.label, details());
    }
}
