//! Typed-transaction and mempool errors (C7).

use alloy_primitives::{Address, B256};

#[derive(Debug, thiserror::Error)]
pub enum TxError {
    #[error("wrong transaction type byte: expected {expected:#04x}, found {found:#04x}")]
    WrongTxType { expected: u8, found: u8 },

    #[error("malformed transaction body: {0}")]
    MalformedBody(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MempoolError {
    #[error("transaction failed x402 verification: {reason:?}")]
    FailedVerification {
        reason: splendor_x402_types::ErrorReason,
    },

    #[error("duplicate (from, nonce) already pending: from {from}, nonce {nonce}")]
    DuplicatePending { from: Address, nonce: B256 },

    #[error(transparent)]
    Tx(#[from] TxError),
}
