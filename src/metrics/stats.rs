use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use tokio::sync::RwLock;

/// Shared collector for publish/consume counts and end-to-end latency
/// computed from event timestamps.
pub struct Stats {
    // Latency histogram (millisecond precision)
    latency_hist: RwLock<Histogram<u64>>,

    published_count: RwLock<u64>,
    consumed_count: RwLock<u64>,
    error_count: RwLock<u64>,

    start_time: Instant,
    last_snapshot: RwLock<(Instant, u64)>,
}

impl Stats {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            // 1ms to 1h range, 3 significant digits
            latency_hist: RwLock::new(Histogram::new_with_bounds(1, 3_600_000, 3).unwrap()),
            published_count: RwLock::new(0),
            consumed_count: RwLock::new(0),
            error_count: RwLock::new(0),
            start_time: now,
            last_snapshot: RwLock::new((now, 0)),
        }
    }

    /// Record a successfully published event
    pub async fn record_published(&self) {
        let mut count = self.published_count.write().await;
        *count += 1;
    }

    /// Record a consumed event with its end-to-end latency in milliseconds
    pub async fn record_consumed(&self, latency_ms: u64) {
        let mut count = self.consumed_count.write().await;
        *count += 1;

        let mut hist = self.latency_hist.write().await;
        let _ = hist.record(latency_ms.max(1));
    }

    /// Record a publish or decode error
    pub async fn record_error(&self) {
        let mut count = self.error_count.write().await;
        *count += 1;
    }

    /// Get current snapshot of statistics
    pub async fn snapshot(&self) -> StatsSnapshot {
        let now = Instant::now();
        let published = *self.published_count.read().await;
        let consumed = *self.consumed_count.read().await;
        let errors = *self.error_count.read().await;

        let hist = self.latency_hist.read().await;
        let (interval_duration, interval_consumed_count) = {
            let mut last = self.last_snapshot.write().await;
            let (last_instant, last_consumed) = *last;
            *last = (now, consumed);
            (now.duration_since(last_instant), consumed - last_consumed)
        };

        StatsSnapshot {
            published_count: published,
            consumed_count: consumed,
            error_count: errors,
            latency_ms_p50: hist.value_at_quantile(0.5),
            latency_ms_p95: hist.value_at_quantile(0.95),
            latency_ms_p99: hist.value_at_quantile(0.99),
            total_duration: now.duration_since(self.start_time),
            interval_duration,
            interval_consumed_count,
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub published_count: u64,
    pub consumed_count: u64,
    pub error_count: u64,
    pub latency_ms_p50: u64,
    pub latency_ms_p95: u64,
    pub latency_ms_p99: u64,
    pub total_duration: Duration,
    pub interval_duration: Duration,
    pub interval_consumed_count: u64,
}

impl StatsSnapshot {
    /// Average publish rate over the whole run
    pub fn publish_rate(&self) -> f64 {
        let elapsed = self.total_duration.as_secs_f64();
        if elapsed > 0.0 {
            self.published_count as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Average consume rate over the whole run
    pub fn consume_rate(&self) -> f64 {
        let elapsed = self.total_duration.as_secs_f64();
        if elapsed > 0.0 {
            self.consumed_count as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Consume rate since the previous snapshot
    pub fn interval_consume_rate(&self) -> f64 {
        let elapsed = self.interval_duration.as_secs_f64();
        if elapsed > 0.0 {
            self.interval_consumed_count as f64 / elapsed
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counters_accumulate() {
        let stats = Stats::new();
        stats.record_published().await;
        stats.record_published().await;
        stats.record_consumed(12).await;
        stats.record_error().await;

        let snap = stats.snapshot().await;
        assert_eq!(snap.published_count, 2);
        assert_eq!(snap.consumed_count, 1);
        assert_eq!(snap.error_count, 1);
    }

    #[tokio::test]
    async fn interval_counts_reset_between_snapshots() {
        let stats = Stats::new();
        stats.record_consumed(5).await;
        let first = stats.snapshot().await;
        assert_eq!(first.interval_consumed_count, 1);

        let second = stats.snapshot().await;
        assert_eq!(second.interval_consumed_count, 0);
        assert_eq!(second.consumed_count, 1);
    }

    #[tokio::test]
    async fn zero_latency_is_clamped_into_histogram_range() {
        let stats = Stats::new();
        stats.record_consumed(0).await;
        let snap = stats.snapshot().await;
        assert_eq!(snap.latency_ms_p99, 1);
    }
}
