//! Per-kind processed-count and exponentially-averaged wall time (spec §4.2 "Statistics").

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Smoothing factor for the exponential moving average of batch wall time. Higher weighs
/// recent batches more heavily.
const EMA_ALPHA: f64 = 0.2;

#[derive(Debug, Default)]
pub struct KindStats {
    processed: AtomicU64,
    truncated_items: AtomicU64,
    fallbacks: AtomicU64,
    avg_wall_time_ms: Mutex<f64>,
}

impl KindStats {
    pub fn record_batch(&self, items: usize, wall_time: Duration, fell_back: bool) {
        self.processed.fetch_add(items as u64, Ordering::Relaxed);
        if fell_back {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        let sample_ms = wall_time.as_secs_f64() * 1000.0;
        let mut avg = self.avg_wall_time_ms.lock().expect("stats lock poisoned");
        *avg = if *avg == 0.0 {
            sample_ms
        } else {
            EMA_ALPHA * sample_ms + (1.0 - EMA_ALPHA) * *avg
        };
    }

    pub fn record_truncation(&self, count: usize) {
        self.truncated_items.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn truncated_items(&self) -> u64 {
        self.truncated_items.load(Ordering::Relaxed)
    }

    pub fn avg_wall_time_ms(&self) -> f64 {
        *self.avg_wall_time_ms.lock().expect("stats lock poisoned")
    }
}

/// Processed-count and timing stats for each of the three batch kinds (spec §4.2).
#[derive(Debug, Default)]
pub struct GpuStats {
    pub hash: KindStats,
    pub signature: KindStats,
    pub tx_decode: KindStats,
}
