use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tk_core::TopKStats;

#[derive(Clone, Default)]
pub struct MetricsRegistry {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    elements_fed: AtomicU64,
    snapshots_taken: AtomicU64,
    snapshots_cancelled: AtomicU64,
    snapshot_wait_peak_us: AtomicU64,
}

impl MetricsRegistry {
    pub fn inc_elements_fed(&self, delta: u64) {
        self.inner.elements_fed.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_snapshots_taken(&self, delta: u64) {
        self.inner.snapshots_taken.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_snapshots_cancelled(&self, delta: u64) {
        self.inner.snapshots_cancelled.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn record_snapshot_wait(&self, waited: Duration) {
        let micros = u64::try_from(waited.as_micros()).unwrap_or(u64::MAX);
        self.inner
            .snapshot_wait_peak_us
            .fetch_max(micros, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            elements_fed: self.inner.elements_fed.load(Ordering::Relaxed),
            snapshots_taken: self.inner.snapshots_taken.load(Ordering::Relaxed),
            snapshots_cancelled: self.inner.snapshots_cancelled.load(Ordering::Relaxed),
            snapshot_wait_peak_us: self.inner.snapshot_wait_peak_us.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsSnapshot {
    pub elements_fed: u64,
    pub snapshots_taken: u64,
    pub snapshots_cancelled: u64,
    pub snapshot_wait_peak_us: u64,
}

impl MetricsSnapshot {
    /// Renders one JSON line, merging in the set's own counters when given.
    pub fn to_json_line(&self, label: &str, topk: Option<TopKStats>, elapsed: Option<Duration>) -> String {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            label: &'a str,
            elements_fed: u64,
            snapshots_taken: u64,
            snapshots_cancelled: u64,
            snapshot_wait_peak_us: u64,
            topk: Option<TopKStats>,
            elapsed_ms: Option<u128>,
        }

        let payload = Snapshot {
            label,
            elements_fed: self.elements_fed,
            snapshots_taken: self.snapshots_taken,
            snapshots_cancelled: self.snapshots_cancelled,
            snapshot_wait_peak_us: self.snapshot_wait_peak_us,
            topk,
            elapsed_ms: elapsed.map(|d| d.as_millis()),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{}"))
    }
}

pub struct RunTimer {
    start: Instant,
}

impl RunTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_across_clones() {
        let metrics = MetricsRegistry::default();
        let clone = metrics.clone();
        metrics.inc_elements_fed(10);
        clone.inc_elements_fed(5);
        clone.inc_snapshots_taken(2);
        metrics.inc_snapshots_cancelled(1);

        let snap = metrics.snapshot();
        assert_eq!(snap.elements_fed, 15);
        assert_eq!(snap.snapshots_taken, 2);
        assert_eq!(snap.snapshots_cancelled, 1);
    }

    #[test]
    fn wait_peak_keeps_maximum() {
        let metrics = MetricsRegistry::default();
        metrics.record_snapshot_wait(Duration::from_micros(300));
        metrics.record_snapshot_wait(Duration::from_micros(100));
        assert_eq!(metrics.snapshot().snapshot_wait_peak_us, 300);
    }

    #[test]
    fn json_line_includes_topk_stats() {
        let metrics = MetricsRegistry::default();
        metrics.inc_elements_fed(3);
        let stats = TopKStats { recorded: 3, evicted: 1, snapshots: 0 };
        let line = metrics
            .snapshot()
            .to_json_line("final", Some(stats), Some(Duration::from_millis(12)));
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["label"], "final");
        assert_eq!(parsed["elements_fed"], 3);
        assert_eq!(parsed["topk"]["evicted"], 1);
        assert_eq!(parsed["elapsed_ms"], 12);
    }
}
