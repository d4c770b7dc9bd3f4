//! Routing strategy between the CPU path and [`splendor_gpu`] (spec §4.3).

/// How a batch's items are split between the CPU path and the GPU queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `r = 1`: every item runs on the CPU path.
    CpuOnly,
    /// `r = 0`: every item is dispatched to the GPU queue.
    GpuOnly,
    /// `r` adapts over time, starting from `cpu_gpu_ratio` (spec §6.7).
    Hybrid,
}

impl Strategy {
    /// The fixed CPU share for strategies that don't adapt; `None` for [`Strategy::Hybrid`],
    /// whose ratio is tracked separately by the scheduler.
    pub fn fixed_ratio(self) -> Option<f64> {
        match self {
            Strategy::CpuOnly => Some(1.0),
            Strategy::GpuOnly => Some(0.0),
            Strategy::Hybrid => None,
        }
    }
}
