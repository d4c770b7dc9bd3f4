//! Errors surfaced by the GPU batch-processing pipeline (spec §7).

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    /// The kind's queue is at its configured capacity (default 100 batches); upstream should
    /// either retry or process the batch on the CPU directly.
    #[error("GPU batch queue is full")]
    QueueFull,

    /// The accelerator entry-point returned non-zero, or the worker task panicked; the batch
    /// is re-run on the CPU path, so this is normally only surfaced in logs, never to the
    /// callback. If the CPU fallback itself panics, this is what the callback receives —
    /// there is no further fallback left to try.
    #[error("accelerator failure, falling back to CPU: {0}")]
    AcceleratorFailure(String),

    /// The node is shutting down; in-flight batches are drained with this error rather than
    /// left to hang.
    #[error("GPU worker cancelled during shutdown")]
    Cancelled,
}
