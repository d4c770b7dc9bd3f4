//! Errors raised while verifying or settling a payment.
//!
//! [`PaymentError`] covers both the recoverable validation failures a caller sees as
//! `invalid_reason`/`error_reason` strings (§7, "Validation errors") and the handful of
//! infrastructure failures that have no sensible wire representation.

use splendor_x402_types::ErrorReason;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// One of the ordered checks in §4.5 failed; maps 1:1 onto [`ErrorReason`].
    #[error("payment rejected: {0}")]
    Invalid(#[from] ErrorReason),

    /// The signature was malformed or did not recover to `payload.from` under either the
    /// v2 or v1 canonical message.
    #[error("signature error: {0}")]
    InvalidSignature(String),

    /// The chain-state view this engine was given could not answer a query it needed.
    #[error("chain state error: {0}")]
    ChainState(String),
}

impl PaymentError {
    /// The wire-level reason to report, when this error has one. Infra errors don't.
    pub fn reason(&self) -> Option<ErrorReason> {
        match self {
            PaymentError::Invalid(reason) => Some(*reason),
            PaymentError::InvalidSignature(_) => Some(ErrorReason::InvalidSignature),
            PaymentError::ChainState(_) => None,
        }
    }
}
