#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Verification, settlement and revenue accounting for x402 micropayments (C5).
//!
//! # Modules
//!
//! - [`chain_state`] — the [`chain_state::ChainState`] seam onto account balances and block
//!   time, plus an in-memory reference implementation.
//! - [`anti_replay`] — the `(from, nonce)` replay registry.
//! - [`revenue`] — off-state validator revenue bookkeeping.
//! - [`engine`] — [`engine::PaymentEngine`], which ties the above into `verify`/`settle`.
//! - [`error`] — [`error::PaymentError`].

pub mod anti_replay;
pub mod chain_state;
pub mod engine;
pub mod error;
pub mod revenue;

pub use anti_replay::{ANTI_REPLAY_SYSTEM_ADDRESS, AntiReplayRegistry};
pub use chain_state::ChainState;
pub use engine::PaymentEngine;
pub use error::PaymentError;
pub use revenue::{DistributionMode, RevenueLedger, RevenueSplit, RevenueStats};
