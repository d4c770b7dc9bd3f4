//! CPU/GPU batch routing and adaptation (spec §4.3).
//!
//! `process_*` splits an incoming batch by the current CPU share `r`, runs the CPU share
//! in-place and the GPU share through [`splendor_gpu::GpuProcessor`], and reassembles results
//! in the original order. A background tick (grounded on the teacher's `ProviderCache`
//! periodic-refresh idiom) adapts `r` toward the configured utilization ceilings.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use splendor_gpu::{GpuError, GpuProcessor, TxResult};
use tokio_util::sync::CancellationToken;

use crate::batch_size::next_batch_size;
use crate::stats::{HybridStats, adapt_ratio};
use crate::strategy::Strategy;

/// How often the adaptation tick recomputes stats and, for [`Strategy::Hybrid`], the CPU
/// share (spec §4.3 "fixed tick (default 500 ms)").
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub strategy: Strategy,
    pub cpu_gpu_ratio: f64,
    pub gpu_threshold: usize,
    pub throughput_target: u64,
    pub max_cpu_utilization: f64,
    pub max_gpu_utilization: f64,
    pub tick_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            strategy: Strategy::Hybrid,
            cpu_gpu_ratio: 0.15,
            gpu_threshold: 1000,
            throughput_target: 50_000,
            max_cpu_utilization: 0.85,
            max_gpu_utilization: 0.90,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Routes hash/signature/tx-decode batches between the CPU path and the GPU queue, adapting
/// the split over time for [`Strategy::Hybrid`] (spec §4.3).
pub struct HybridScheduler {
    gpu: Arc<GpuProcessor>,
    config: SchedulerConfig,
    ratio: Mutex<f64>,
    stats: Mutex<HybridStats>,
}

impl HybridScheduler {
    pub fn new(gpu: Arc<GpuProcessor>, config: SchedulerConfig) -> Arc<Self> {
        let initial_ratio = config.strategy.fixed_ratio().unwrap_or(config.cpu_gpu_ratio);
        Arc::new(HybridScheduler {
            gpu,
            config,
            ratio: Mutex::new(initial_ratio),
            stats: Mutex::new(HybridStats::idle(config.strategy)),
        })
    }

    /// Current CPU share `r`.
    pub fn ratio(&self) -> f64 {
        *self.ratio.lock().expect("ratio lock poisoned")
    }

    pub fn stats(&self) -> HybridStats {
        *self.stats.lock().expect("stats lock poisoned")
    }

    /// Routes a keccak-256 batch (spec §4.3 `process(batch)`).
    pub async fn process_hashes(&self, inputs: Vec<Vec<u8>>) -> Result<Vec<[u8; 32]>, GpuError> {
        let total = inputs.len();
        if total < self.config.gpu_threshold {
            return Ok(splendor_gpu::hash::compute(&inputs).0);
        }

        let cpu_count = split_count(total, self.ratio());
        let mut iter = inputs.into_iter();
        let cpu_part: Vec<Vec<u8>> = (&mut iter).take(cpu_count).collect();
        let gpu_part: Vec<Vec<u8>> = iter.collect();

        let cpu_results = splendor_gpu::hash::compute(&cpu_part).0;
        let gpu_results = self.dispatch_hashes(gpu_part).await?;

        let mut results = cpu_results;
        results.extend(gpu_results);
        Ok(results)
    }

    /// Routes a secp256k1 verification batch.
    pub async fn process_signatures(
        &self,
        signatures: Vec<Vec<u8>>,
        messages: Vec<Vec<u8>>,
        public_keys: Vec<Vec<u8>>,
    ) -> Result<Vec<bool>, GpuError> {
        let total = signatures.len();
        if total < self.config.gpu_threshold {
            return Ok(cpu_verify(&signatures, &messages, &public_keys));
        }

        let cpu_count = split_count(total, self.ratio());
        let cpu_results = cpu_verify(
            &signatures[..cpu_count],
            &messages[..cpu_count],
            &public_keys[..cpu_count],
        );
        let gpu_results = self
            .dispatch_signatures(
                signatures[cpu_count..].to_vec(),
                messages[cpu_count..].to_vec(),
                public_keys[cpu_count..].to_vec(),
            )
            .await?;

        let mut results = cpu_results;
        results.extend(gpu_results);
        Ok(results)
    }

    /// Routes an RLP-decode + hash + field-extraction batch.
    pub async fn process_transactions(&self, txs: Vec<Vec<u8>>) -> Result<Vec<TxResult>, GpuError> {
        let total = txs.len();
        if total < self.config.gpu_threshold {
            return Ok(splendor_gpu::tx_decode::compute(&txs).0);
        }

        let cpu_count = split_count(total, self.ratio());
        let mut iter = txs.into_iter();
        let cpu_part: Vec<Vec<u8>> = (&mut iter).take(cpu_count).collect();
        let gpu_part: Vec<Vec<u8>> = iter.collect();

        let cpu_results = splendor_gpu::tx_decode::compute(&cpu_part).0;
        let gpu_results = self.dispatch_transactions(gpu_part).await?;

        let mut results = cpu_results;
        results.extend(gpu_results);
        Ok(results)
    }

    async fn dispatch_hashes(&self, inputs: Vec<Vec<u8>>) -> Result<Vec<[u8; 32]>, GpuError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.gpu.submit_hashes(inputs, move |result| {
            let _ = tx.send(result);
        })?;
        rx.await.map_err(|_| GpuError::Cancelled)?
    }

    async fn dispatch_signatures(
        &self,
        signatures: Vec<Vec<u8>>,
        messages: Vec<Vec<u8>>,
        public_keys: Vec<Vec<u8>>,
    ) -> Result<Vec<bool>, GpuError> {
        if signatures.is_empty() {
            return Ok(Vec::new());
        }
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.gpu.submit_signatures(signatures, messages, public_keys, move |result| {
            let _ = tx.send(result);
        })?;
        rx.await.map_err(|_| GpuError::Cancelled)?
    }

    async fn dispatch_transactions(&self, txs: Vec<Vec<u8>>) -> Result<Vec<TxResult>, GpuError> {
        if txs.is_empty() {
            return Ok(Vec::new());
        }
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.gpu.submit_transactions(txs, move |result| {
            let _ = tx.send(result);
        })?;
        rx.await.map_err(|_| GpuError::Cancelled)?
    }

    /// Runs the periodic adaptation tick until `cancel` fires (spec §5 "hybrid-stats ticker
    /// runs as an independent task supervised by a shared lifecycle context").
    pub async fn run_adaptation_tick(self: Arc<Self>, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        let mut last_processed: u64 = 0;
        let mut last_tick = Instant::now();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("hybrid scheduler adaptation tick shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.tick_once(&mut last_processed, &mut last_tick);
                }
            }
        }
    }

    fn tick_once(&self, last_processed: &mut u64, last_tick: &mut Instant) {
        let gpu_stats = self.gpu.stats();
        let processed = gpu_stats.hash.processed() + gpu_stats.signature.processed() + gpu_stats.tx_decode.processed();
        let now = Instant::now();
        let elapsed = now.duration_since(*last_tick).as_secs_f64().max(1e-6);
        let delta = processed.saturating_sub(*last_processed);
        let tps = delta as f64 / elapsed;
        *last_processed = processed;
        *last_tick = now;

        let ratio_now = self.ratio();
        let target = self.config.throughput_target.max(1) as f64;
        let cpu_utilization = (ratio_now * tps / target).min(1.0);
        let gpu_utilization = ((1.0 - ratio_now) * tps / target).min(1.0);

        if matches!(self.config.strategy, Strategy::Hybrid) {
            let new_ratio = adapt_ratio(
                ratio_now,
                cpu_utilization,
                gpu_utilization,
                self.config.max_cpu_utilization,
                self.config.max_gpu_utilization,
            );
            *self.ratio.lock().expect("ratio lock poisoned") = new_ratio;
        }

        let queue_depths = self.gpu.queue_depths();
        let avg_latency_ms = (gpu_stats.hash.avg_wall_time_ms()
            + gpu_stats.signature.avg_wall_time_ms()
            + gpu_stats.tx_decode.avg_wall_time_ms())
            / 3.0;

        let _recommended_batch_size = next_batch_size(tps, target);

        *self.stats.lock().expect("stats lock poisoned") = HybridStats {
            current_tps: tps,
            cpu_utilization,
            gpu_utilization,
            avg_latency_ms,
            queue_depth: queue_depths.hash + queue_depths.signature + queue_depths.tx_decode,
            strategy: self.config.strategy,
        };
    }
}

fn split_count(total: usize, ratio: f64) -> usize {
    ((total as f64) * ratio.clamp(0.0, 1.0)).round() as usize
}

fn cpu_verify(signatures: &[Vec<u8>], messages: &[Vec<u8>], public_keys: &[Vec<u8>]) -> Vec<bool> {
    let items: Vec<splendor_gpu::signature::SignatureItem<'_>> = signatures
        .iter()
        .zip(messages.iter())
        .zip(public_keys.iter())
        .map(|((sig, msg), pk)| splendor_gpu::signature::SignatureItem {
            signature: sig,
            message: msg,
            public_key: pk,
        })
        .collect();
    splendor_gpu::signature::compute(&items)
}
