//! The GPU batch processor (C2): bounded per-kind queues drained by worker pools, with CPU
//! fallback and panic isolation (spec §4.2).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::backend::GpuBackend;
use crate::error::GpuError;
use crate::hash;
use crate::signature::{self, SignatureItem};
use crate::stats::GpuStats;
use crate::tx_decode::{self, TxResult};

/// Batches larger than this queue up behind a worker; beyond `DEFAULT_QUEUE_CAPACITY`
/// batches per kind, submission fails with [`GpuError::QueueFull`] (spec §4.2).
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Worker pool size per kind, absent an explicit override (spec §6.7 `GPU_*_WORKERS`).
pub const DEFAULT_WORKERS_PER_KIND: usize = 32;

/// Queued-but-not-yet-picked-up batch counts, one per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueDepths {
    pub hash: usize,
    pub signature: usize,
    pub tx_decode: usize,
}

type HashCallback = Box<dyn FnOnce(Result<Vec<[u8; 32]>, GpuError>) + Send>;
type SignatureCallback = Box<dyn FnOnce(Result<Vec<bool>, GpuError>) + Send>;
type TxCallback = Box<dyn FnOnce(Result<Vec<TxResult>, GpuError>) + Send>;

struct HashJob {
    inputs: Vec<Vec<u8>>,
    callback: HashCallback,
}

struct SignatureJob {
    signatures: Vec<Vec<u8>>,
    messages: Vec<Vec<u8>>,
    public_keys: Vec<Vec<u8>>,
    callback: SignatureCallback,
}

struct TxJob {
    txs: Vec<Vec<u8>>,
    callback: TxCallback,
}

/// Worker pool configuration for the three batch kinds.
#[derive(Debug, Clone, Copy)]
pub struct GpuProcessorConfig {
    pub queue_capacity: usize,
    pub hash_workers: usize,
    pub signature_workers: usize,
    pub tx_decode_workers: usize,
}

impl Default for GpuProcessorConfig {
    fn default() -> Self {
        GpuProcessorConfig {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            hash_workers: DEFAULT_WORKERS_PER_KIND,
            signature_workers: DEFAULT_WORKERS_PER_KIND,
            tx_decode_workers: DEFAULT_WORKERS_PER_KIND,
        }
    }
}

/// Entry point into the GPU/CPU hybrid pipeline's batch execution (spec §4.2).
///
/// Submission functions enqueue a batch and a callback; a worker picks the batch up,
/// executes it (accelerator first if one is linked, CPU otherwise or on accelerator
/// failure), and fires the callback exactly once.
pub struct GpuProcessor {
    backend: GpuBackend,
    stats: Arc<GpuStats>,
    hash_tx: mpsc::Sender<HashJob>,
    signature_tx: mpsc::Sender<SignatureJob>,
    tx_tx: mpsc::Sender<TxJob>,
}

impl GpuProcessor {
    /// Spawns the worker pools and returns a handle to submit batches to them. Workers run
    /// until `cancel` fires, draining in-flight batches and firing their callbacks with
    /// [`GpuError::Cancelled`] before exiting (spec §5 "Shutdown cancels the context").
    pub fn spawn(backend: GpuBackend, config: GpuProcessorConfig, cancel: CancellationToken) -> Self {
        let stats = Arc::new(GpuStats::default());

        let (hash_tx, hash_rx) = mpsc::channel(config.queue_capacity);
        let (signature_tx, signature_rx) = mpsc::channel(config.queue_capacity);
        let (tx_tx, tx_rx) = mpsc::channel(config.queue_capacity);

        spawn_hash_workers(config.hash_workers, hash_rx, backend, stats.clone(), cancel.clone());
        spawn_signature_workers(
            config.signature_workers,
            signature_rx,
            backend,
            stats.clone(),
            cancel.clone(),
        );
        spawn_tx_workers(config.tx_decode_workers, tx_rx, backend, stats.clone(), cancel.clone());

        GpuProcessor {
            backend,
            stats,
            hash_tx,
            signature_tx,
            tx_tx,
        }
    }

    pub fn backend(&self) -> GpuBackend {
        self.backend
    }

    pub fn stats(&self) -> &GpuStats {
        &self.stats
    }

    /// Batches currently queued (not yet picked up by a worker), per kind. Used by the hybrid
    /// scheduler to report `queue_depth` (spec §3 "Hybrid Stats").
    pub fn queue_depths(&self) -> QueueDepths {
        QueueDepths {
            hash: self.hash_tx.max_capacity() - self.hash_tx.capacity(),
            signature: self.signature_tx.max_capacity() - self.signature_tx.capacity(),
            tx_decode: self.tx_tx.max_capacity() - self.tx_tx.capacity(),
        }
    }

    /// Enqueues a keccak-256 batch. An empty batch invokes `callback` immediately with an
    /// empty result, without touching the queue (spec §4.2 "Tie-breaks").
    pub fn submit_hashes(
        &self,
        inputs: Vec<Vec<u8>>,
        callback: impl FnOnce(Result<Vec<[u8; 32]>, GpuError>) + Send + 'static,
    ) -> Result<(), GpuError> {
        if inputs.is_empty() {
            callback(Ok(Vec::new()));
            return Ok(());
        }
        self.hash_tx
            .try_send(HashJob {
                inputs,
                callback: Box::new(callback),
            })
            .map_err(|_| GpuError::QueueFull)
    }

    /// Enqueues a secp256k1 verification batch.
    pub fn submit_signatures(
        &self,
        signatures: Vec<Vec<u8>>,
        messages: Vec<Vec<u8>>,
        public_keys: Vec<Vec<u8>>,
        callback: impl FnOnce(Result<Vec<bool>, GpuError>) + Send + 'static,
    ) -> Result<(), GpuError> {
        if signatures.is_empty() {
            callback(Ok(Vec::new()));
            return Ok(());
        }
        self.signature_tx
            .try_send(SignatureJob {
                signatures,
                messages,
                public_keys,
                callback: Box::new(callback),
            })
            .map_err(|_| GpuError::QueueFull)
    }

    /// Enqueues an RLP-decode + hash + field-extraction batch.
    pub fn submit_transactions(
        &self,
        txs: Vec<Vec<u8>>,
        callback: impl FnOnce(Result<Vec<TxResult>, GpuError>) + Send + 'static,
    ) -> Result<(), GpuError> {
        if txs.is_empty() {
            callback(Ok(Vec::new()));
            return Ok(());
        }
        self.tx_tx
            .try_send(TxJob {
                txs,
                callback: Box::new(callback),
            })
            .map_err(|_| GpuError::QueueFull)
    }
}

/// Simulates invoking the accelerator entry-point. No CUDA/OpenCL kernel is linked in this
/// workspace (see [`crate::backend::probe`]), so this always reports a failure and the
/// caller falls back to the CPU implementation — which is the real, exercised code path,
/// not a placeholder (spec §4.2 "Fallback policy").
fn accelerator_unavailable() -> GpuError {
    GpuError::AcceleratorFailure("no accelerator kernel linked in this build".to_string())
}

fn spawn_hash_workers(
    count: usize,
    rx: mpsc::Receiver<HashJob>,
    backend: GpuBackend,
    stats: Arc<GpuStats>,
    cancel: CancellationToken,
) {
    let rx = Arc::new(Mutex::new(rx));
    for _ in 0..count {
        let rx = rx.clone();
        let stats = stats.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                let job = {
                    let mut guard = rx.lock().await;
                    tokio::select! {
                        _ = cancel.cancelled() => None,
                        job = guard.recv() => job,
                    }
                };
                let Some(job) = job else { break };
                if cancel.is_cancelled() {
                    (job.callback)(Err(GpuError::Cancelled));
                    continue;
                }

                let start = Instant::now();
                let item_count = job.inputs.len();
                match run_hash_batch(backend, job.inputs) {
                    Ok((result, fell_back)) => {
                        stats.hash.record_batch(item_count, start.elapsed(), fell_back);
                        (job.callback)(Ok(result));
                    }
                    Err(e) => {
                        stats.hash.record_batch(item_count, start.elapsed(), true);
                        (job.callback)(Err(e));
                    }
                }
            }
        });
    }
}

/// Runs a hash batch to completion, isolating panics from both the (simulated) accelerator
/// call and the CPU fallback it falls back to — a panic in either converts to a fallback or
/// an error rather than killing the worker task (spec §4.2 "Panic isolation").
fn run_hash_batch(backend: GpuBackend, inputs: Vec<Vec<u8>>) -> Result<(Vec<[u8; 32]>, bool), GpuError> {
    if backend != GpuBackend::None {
        match std::panic::catch_unwind(AssertUnwindSafe(|| Err::<(), _>(accelerator_unavailable()))) {
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "hash batch falling back to CPU");
            }
            Ok(Ok(())) => unreachable!(),
            Err(_) => {
                tracing::warn!("hash worker panicked; falling back to CPU");
            }
        }
    }
    match std::panic::catch_unwind(AssertUnwindSafe(|| hash::compute(&inputs))) {
        Ok((digests, _truncated)) => Ok((digests, true)),
        Err(_) => {
            let msg = "hash batch CPU fallback panicked";
            tracing::error!(msg);
            Err(GpuError::AcceleratorFailure(msg.to_string()))
        }
    }
}

fn spawn_signature_workers(
    count: usize,
    rx: mpsc::Receiver<SignatureJob>,
    backend: GpuBackend,
    stats: Arc<GpuStats>,
    cancel: CancellationToken,
) {
    let rx = Arc::new(Mutex::new(rx));
    for _ in 0..count {
        let rx = rx.clone();
        let stats = stats.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                let job = {
                    let mut guard = rx.lock().await;
                    tokio::select! {
                        _ = cancel.cancelled() => None,
                        job = guard.recv() => job,
                    }
                };
                let Some(job) = job else { break };
                if cancel.is_cancelled() {
                    (job.callback)(Err(GpuError::Cancelled));
                    continue;
                }

                let start = Instant::now();
                let item_count = job.signatures.len();
                match run_signature_batch(backend, &job.signatures, &job.messages, &job.public_keys) {
                    Ok((results, fell_back)) => {
                        stats.signature.record_batch(item_count, start.elapsed(), fell_back);
                        (job.callback)(Ok(results));
                    }
                    Err(e) => {
                        stats.signature.record_batch(item_count, start.elapsed(), true);
                        (job.callback)(Err(e));
                    }
                }
            }
        });
    }
}

/// Runs a signature-verification batch to completion, isolating panics the same way
/// [`run_hash_batch`] does (spec §4.2 "Panic isolation").
fn run_signature_batch(
    backend: GpuBackend,
    signatures: &[Vec<u8>],
    messages: &[Vec<u8>],
    public_keys: &[Vec<u8>],
) -> Result<(Vec<bool>, bool), GpuError> {
    if backend != GpuBackend::None {
        match std::panic::catch_unwind(AssertUnwindSafe(|| Err::<(), _>(accelerator_unavailable()))) {
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "signature batch falling back to CPU");
            }
            Ok(Ok(())) => unreachable!(),
            Err(_) => {
                tracing::warn!("signature worker panicked; falling back to CPU");
            }
        }
    }
    let items: Vec<SignatureItem<'_>> = signatures
        .iter()
        .zip(messages.iter())
        .zip(public_keys.iter())
        .map(|((sig, msg), pk)| SignatureItem {
            signature: sig,
            message: msg,
            public_key: pk,
        })
        .collect();
    match std::panic::catch_unwind(AssertUnwindSafe(|| signature::compute(&items))) {
        Ok(results) => Ok((results, true)),
        Err(_) => {
            let msg = "signature batch CPU fallback panicked";
            tracing::error!(msg);
            Err(GpuError::AcceleratorFailure(msg.to_string()))
        }
    }
}

fn spawn_tx_workers(
    count: usize,
    rx: mpsc::Receiver<TxJob>,
    backend: GpuBackend,
    stats: Arc<GpuStats>,
    cancel: CancellationToken,
) {
    let rx = Arc::new(Mutex::new(rx));
    for _ in 0..count {
        let rx = rx.clone();
        let stats = stats.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                let job = {
                    let mut guard = rx.lock().await;
                    tokio::select! {
                        _ = cancel.cancelled() => None,
                        job = guard.recv() => job,
                    }
                };
                let Some(job) = job else { break };
                if cancel.is_cancelled() {
                    (job.callback)(Err(GpuError::Cancelled));
                    continue;
                }

                let start = Instant::now();
                let item_count = job.txs.len();
                match run_tx_batch(backend, &job.txs) {
                    Ok((results, truncated, fell_back)) => {
                        if truncated > 0 {
                            stats.tx_decode.record_truncation(truncated);
                        }
                        stats.tx_decode.record_batch(item_count, start.elapsed(), fell_back);
                        (job.callback)(Ok(results));
                    }
                    Err(e) => {
                        stats.tx_decode.record_batch(item_count, start.elapsed(), true);
                        (job.callback)(Err(e));
                    }
                }
            }
        });
    }
}

/// Runs a transaction-decode batch to completion, isolating panics the same way
/// [`run_hash_batch`] does (spec §4.2 "Panic isolation").
fn run_tx_batch(backend: GpuBackend, txs: &[Vec<u8>]) -> Result<(Vec<TxResult>, usize, bool), GpuError> {
    if backend != GpuBackend::None {
        match std::panic::catch_unwind(AssertUnwindSafe(|| Err::<(), _>(accelerator_unavailable()))) {
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "transaction batch falling back to CPU");
            }
            Ok(Ok(())) => unreachable!(),
            Err(_) => {
                tracing::warn!("transaction worker panicked; falling back to CPU");
            }
        }
    }
    match std::panic::catch_unwind(AssertUnwindSafe(|| tx_decode::compute(txs))) {
        Ok((results, truncated)) => Ok((results, truncated, true)),
        Err(_) => {
            let msg = "transaction batch CPU fallback panicked";
            tracing::error!(msg);
            Err(GpuError::AcceleratorFailure(msg.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;

    async fn spawn_none_backend() -> (GpuProcessor, CancellationToken) {
        let cancel = CancellationToken::new();
        let processor = GpuProcessor::spawn(GpuBackend::None, GpuProcessorConfig::default(), cancel.clone());
        (processor, cancel)
    }

    #[tokio::test]
    async fn empty_hash_batch_fires_callback_without_enqueueing() {
        let (processor, _cancel) = spawn_none_backend().await;
        let (tx, rx) = std_mpsc::channel();
        processor
            .submit_hashes(Vec::new(), move |result| {
                tx.send(result).unwrap();
            })
            .unwrap();
        let result = rx.recv().unwrap();
        assert_eq!(result.unwrap(), Vec::<[u8; 32]>::new());
    }

    #[tokio::test]
    async fn hash_batch_computes_keccak_on_cpu_fallback() {
        let (processor, _cancel) = spawn_none_backend().await;
        let (tx, rx) = tokio::sync::oneshot::channel();
        let mut tx = Some(tx);
        processor
            .submit_hashes(vec![b"hello".to_vec()], move |result| {
                tx.take().unwrap().send(result).unwrap();
            })
            .unwrap();
        let digests = rx.await.unwrap().unwrap();
        assert_eq!(digests[0], *alloy_primitives::keccak256(b"hello"));
        assert_eq!(processor.stats().hash.processed(), 1);
        assert_eq!(processor.stats().hash.fallbacks(), 1);
    }

    #[tokio::test]
    async fn queue_full_is_reported_without_blocking() {
        let cancel = CancellationToken::new();
        // Zero workers: nothing ever drains the queue, so the second submit overflows it.
        let config = GpuProcessorConfig {
            queue_capacity: 1,
            hash_workers: 0,
            signature_workers: 0,
            tx_decode_workers: 0,
        };
        let processor = GpuProcessor::spawn(GpuBackend::None, config, cancel);
        processor.submit_hashes(vec![b"a".to_vec()], |_| {}).unwrap();
        let err = processor
            .submit_hashes(vec![b"b".to_vec()], |_| {})
            .unwrap_err();
        assert!(matches!(err, GpuError::QueueFull));
    }

    #[test]
    fn run_hash_batch_isolates_a_panicking_compute_call() {
        // Exercises the same catch_unwind boundary run_hash_batch uses around the CPU
        // fallback, with a closure that actually panics (hash::compute itself never does) —
        // confirms the boundary converts a panic into an error rather than propagating it.
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| -> Vec<[u8; 32]> {
            panic!("simulated CPU fallback panic")
        }));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn worker_keeps_draining_the_queue_across_successive_batches() {
        // Not a panic itself, but exercises the same worker loop structure the panic-isolation
        // fix runs through: the loop must keep picking up and completing subsequent batches
        // rather than exiting after handling one (spec §4.2 "Panic isolation").
        let (processor, _cancel) = spawn_none_backend().await;
        let (tx1, rx1) = tokio::sync::oneshot::channel();
        let (tx2, rx2) = tokio::sync::oneshot::channel();
        processor
            .submit_hashes(vec![b"first".to_vec()], move |r| tx1.send(r).unwrap())
            .unwrap();
        processor
            .submit_hashes(vec![b"second".to_vec()], move |r| tx2.send(r).unwrap())
            .unwrap();
        assert!(rx1.await.unwrap().is_ok());
        assert!(rx2.await.unwrap().is_ok());
    }
}
