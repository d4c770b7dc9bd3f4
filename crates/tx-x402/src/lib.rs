#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! The x402 typed transaction: pool admission, block inclusion, and execution receipts (C7).
//!
//! # Modules
//!
//! - [`constants`] — the reserved type byte and system address this protocol depends on.
//! - [`transaction`] — [`transaction::X402Transaction`], the RLP typed-tx envelope.
//! - [`mempool`] — the [`mempool::Mempool`] seam and its in-memory reference implementation.
//! - [`receipt`] — [`receipt::X402Receipt`].
//! - [`error`] — [`error::TxError`] / [`error::MempoolError`].

pub mod constants;
pub mod error;
pub mod mempool;
pub mod receipt;
pub mod transaction;

pub use constants::{ANTI_REPLAY_SYSTEM_ADDRESS, X402_TX_TYPE};
pub use error::{MempoolError, TxError};
pub use mempool::{InMemoryMempool, Mempool};
pub use receipt::X402Receipt;
pub use transaction::{X402Transaction, X402TxBody};
