use std::sync::Mutex;

/// Counters over the detection requests a session has issued.
#[derive(Debug)]
pub struct DetectionMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub issued: usize,
    pub applied: usize,
    pub stale: usize,
    pub failed: usize,
}

impl DetectionMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_issued(&self) {
        self.update(|m| m.issued += 1);
    }

    pub fn record_applied(&self) {
        self.update(|m| m.applied += 1);
    }

    pub fn record_stale(&self) {
        self.update(|m| m.stale += 1);
    }

    pub fn record_failed(&self) {
        self.update(|m| m.failed += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }
}

impl Default for DetectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = DetectionMetrics::new();
        metrics.record_issued();
        metrics.record_issued();
        metrics.record_applied();
        metrics.record_stale();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                issued: 2,
                applied: 1,
                stale: 1,
                failed: 0
            }
        );
    }
}
