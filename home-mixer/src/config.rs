//! Ambient request metrics and per-request context, independent of any
//! single stage. [`Metrics`] is a sharded-counter collector passed in by
//! reference, per the "no global mutable state beyond the two core data
//! structures" design constraint; [`RequestContext`] carries the request id
//! and start time a stage's logging needs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Process-wide counters for request volume, latency, and outcome. Pass by
/// `Arc` reference into the serving edge; never a global.
#[derive(Default)]
pub struct Metrics {
    pub feed_latency_sum_ms: AtomicU64,
    pub feed_latency_count: AtomicU64,
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_error: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self, latency_ms: u64, success: bool) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.feed_latency_sum_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.feed_latency_count.fetch_add(1, Ordering::Relaxed);

        if success {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_error.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cache_access(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn avg_latency_ms(&self) -> f64 {
        let sum = self.feed_latency_sum_ms.load(Ordering::Relaxed);
        let count = self.feed_latency_count.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        }
    }

    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn error_rate(&self) -> f64 {
        let total = self.requests_total.load(Ordering::Relaxed);
        let errors = self.requests_error.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            errors as f64 / total as f64
        }
    }

    pub fn to_prometheus(&self) -> String {
        format!(
            r#"# HELP feed_latency_ms Average feed generation latency
# TYPE feed_latency_ms gauge
feed_latency_ms {:.2}

# HELP requests_total Total number of requests
# TYPE requests_total counter
requests_total {}

# HELP cache_hit_rate Cache hit rate
# TYPE cache_hit_rate gauge
cache_hit_rate {:.4}

# HELP error_rate Error rate
# TYPE error_rate gauge
error_rate {:.6}
"#,
            self.avg_latency_ms(),
            self.requests_total.load(Ordering::Relaxed),
            self.cache_hit_rate(),
            self.error_rate(),
        )
    }
}

/// Per-request bookkeeping: a request id for log correlation and a start
/// time for latency accounting, finished into `metrics` when the request
/// completes.
pub struct RequestContext {
    pub request_id: String,
    pub user_id: u64,
    pub start_time: Instant,
    pub metrics: Arc<Metrics>,
}

impl RequestContext {
    pub fn new(user_id: u64, metrics: Arc<Metrics>) -> Self {
        Self {
            request_id: crate::util::request_util::generate_request_id(user_id),
            user_id,
            start_time: Instant::now(),
            metrics,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    pub fn finish(&self, success: bool) {
        self.metrics.record_request(self.elapsed_ms(), success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_request_latency_and_outcome() {
        let metrics = Metrics::new();

        metrics.record_request(50, true);
        metrics.record_request(60, true);
        metrics.record_request(70, false);

        assert_eq!(metrics.requests_total.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.requests_success.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.requests_error.load(Ordering::Relaxed), 1);
        assert!((metrics.avg_latency_ms() - 60.0).abs() < 0.01);
    }

    #[test]
    fn tracks_cache_hit_rate() {
        let metrics = Metrics::new();

        for _ in 0..70 {
            metrics.record_cache_access(true);
        }
        for _ in 0..30 {
            metrics.record_cache_access(false);
        }

        assert!((metrics.cache_hit_rate() - 0.7).abs() < 0.01);
    }

    #[test]
    fn request_context_finish_records_into_metrics() {
        let metrics = Metrics::new();
        let ctx = RequestContext::new(42, metrics.clone());
        ctx.finish(true);

        assert_eq!(metrics.requests_total.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.requests_success.load(Ordering::Relaxed), 1);
    }
}
