//! Structured logging setup for the Splendor node.
//!
//! Initializes a [`tracing_subscriber`] registry with an [`EnvFilter`](tracing_subscriber::EnvFilter)
//! driven by `RUST_LOG`, falling back to `info` for the node's own crates and `warn` for
//! dependencies. Every long-running subsystem (GPU workers, hybrid scheduler, consensus
//! verification) logs through `tracing` spans rather than `println!`, the way the rest of
//! this workspace does.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global `tracing` subscriber. Safe to call once per process; a second call
/// is a no-op (the underlying `set_global_default` error is swallowed, mirroring how test
/// binaries each try to install their own subscriber).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,splendor=debug"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
