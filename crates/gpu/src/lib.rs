//! GPU-accelerated batch processing for hashes, signatures, and transaction decoding, with a
//! CPU fallback path that is always correct and always exercised (spec §4.2, C2).
//!
//! No CUDA or OpenCL toolchain is linked into this workspace, so [`backend::probe`] always
//! selects [`backend::GpuBackend::None`] and every batch runs on the CPU implementations in
//! [`hash`], [`signature`], and [`tx_decode`]. The queueing, worker-pool, and fallback
//! machinery in [`processor`] is the real, tested code that a future accelerator backend would
//! plug into.

pub mod backend;
pub mod error;
pub mod hash;
pub mod packing;
pub mod processor;
pub mod signature;
pub mod stats;
pub mod tx_decode;

pub use backend::{GpuBackend, GpuProbe};
pub use error::GpuError;
pub use processor::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS_PER_KIND, GpuProcessor, GpuProcessorConfig, QueueDepths};
pub use stats::GpuStats;
pub use tx_decode::TxResult;
