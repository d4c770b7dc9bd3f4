//! Ambient types shared across the Splendor node.
//!
//! This crate carries the bits every other crate in the workspace needs and none of them
//! should redefine: the network identity, node configuration, a Unix timestamp wire type,
//! structured logging setup, graceful shutdown, and a handful of small utilities.
//!
//! # Modules
//!
//! - [`config`] — Node configuration, loaded from environment variables via `clap`.
//! - [`network`] — The Splendor network identity (chain ID, CAIP-2 identifier).
//! - [`shutdown`] — Graceful shutdown on SIGTERM/SIGINT via a shared cancellation token.
//! - [`telemetry`] — `tracing` subscriber setup.
//! - [`timestamp`] — Unix timestamp type used in payment authorization windows.
//! - [`util`] — Small utility types: literal-string wire tags.

pub mod config;
pub mod network;
pub mod shutdown;
pub mod telemetry;
pub mod timestamp;
pub mod util;
