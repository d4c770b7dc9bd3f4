//! Adaptive batch sizing (spec §4.3, §8 monotonicity property).
//!
//! `next_batch_size` is a pure function of how close current throughput is to the configured
//! target, so the monotonicity property in spec.md §8 can be checked with plain `#[test]`
//! functions over synthetic TPS sequences, without driving the tick loop.

/// Smallest batch size the scheduler will ever choose, regardless of TPS ratio.
pub const MIN_BATCH_SIZE: u64 = 64;

/// Largest batch size the scheduler will ever choose, at `tps_ratio >= 1.0`.
pub const MAX_BATCH_SIZE: u64 = 10_000;

/// Computes the batch size for the current tick from how close `current_tps` is to
/// `throughput_target`.
///
/// Growth follows a square-root curve: strictly increasing in `tps_ratio`, with non-increasing
/// increments as the ratio approaches 1 — size grows quickly while far from target and levels
/// off as the target is approached, satisfying the "second derivative non-positive" property.
pub fn next_batch_size(current_tps: f64, throughput_target: f64) -> u64 {
    let ratio = if throughput_target <= 0.0 {
        1.0
    } else {
        (current_tps / throughput_target).clamp(0.0, 1.0)
    };
    let span = (MAX_BATCH_SIZE - MIN_BATCH_SIZE) as f64;
    MIN_BATCH_SIZE + (span * ratio.sqrt()).round() as u64
}
