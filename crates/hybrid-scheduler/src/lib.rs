//! Adaptive CPU/GPU batch routing (spec C3): decides whether a batch runs entirely on the
//! CPU path, entirely through [`splendor_gpu`], or split between the two, and adapts the
//! split over time from live throughput and utilization.

pub mod batch_size;
pub mod scheduler;
pub mod stats;
pub mod strategy;

pub use batch_size::{MAX_BATCH_SIZE, MIN_BATCH_SIZE, next_batch_size};
pub use scheduler::{DEFAULT_TICK_INTERVAL, HybridScheduler, SchedulerConfig};
pub use stats::HybridStats;
pub use strategy::Strategy;
