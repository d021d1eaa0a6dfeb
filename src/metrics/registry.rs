use std::collections::BTreeMap;
use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use super::Route;

// ─── Public types ────────────────────────────────────────────────

/// Per-route running statistics. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteStats {
    pub hits: u64,
    pub errors: u64,
    pub avg_time: f64,
    pub max_time: f64,
    /// `+inf` until the first observation; serde_json writes it as `null`.
    pub min_time: f64,
}

impl RouteStats {
    const fn empty() -> Self {
        Self {
            hits: 0,
            errors: 0,
            avg_time: 0.0,
            max_time: 0.0,
            min_time: f64::INFINITY,
        }
    }

    fn observe(&mut self, secs: f64, is_error: bool) {
        let hits_before = self.hits as f64;
        self.hits += 1;
        if is_error {
            self.errors += 1;
        }
        self.avg_time = (self.avg_time * hits_before + secs) / self.hits as f64;
        self.max_time = self.max_time.max(secs);
        self.min_time = self.min_time.min(secs);
    }
}

/// Read-only copy of every route's statistics, shaped like the
/// `/metrics` response body.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub routes: BTreeMap<&'static str, RouteStats>,
}

/// Thread-safe per-route request statistics.
/// Handlers call `observe()` (or `record_observation()`), `/metrics` calls `snapshot()`.
pub struct MetricsRegistry {
    inner: Mutex<[RouteStats; Route::COUNT]>,
}

// ─── MetricsRegistry impl ────────────────────────────────────────

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new([RouteStats::empty(); Route::COUNT]),
        }
    }

    /// Record one completed request on `route`.
    pub fn record_observation(&self, route: Route, elapsed: Duration, is_error: bool) {
        self.inner.lock()[route.index()].observe(elapsed.as_secs_f64(), is_error);
    }

    /// Drive `fut` to completion and record exactly one observation for it,
    /// timed from this call to the moment the result is available.
    pub async fn observe<T, E, F>(&self, route: Route, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let t0 = Instant::now();
        let result = fut.await;
        self.record_observation(route, t0.elapsed(), result.is_err());
        result
    }

    /// Produce a consistent copy of all routes under a single lock.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let stats = *self.inner.lock();
        MetricsSnapshot {
            routes: Route::ALL
                .iter()
                .map(|route| (route.as_str(), stats[route.index()]))
                .collect(),
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
