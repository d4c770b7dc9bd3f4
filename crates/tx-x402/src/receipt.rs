//! The execution receipt an x402 typed transaction produces once the consensus engine
//! dispatches it to `C5::settle` (spec §4.7).

use alloy_primitives::{Address, B256, U256};

use splendor_x402_types::ErrorReason;

/// Mirrors [`splendor_x402_engine::SettleResponse`] but keyed by transaction hash and
/// carrying the recipient/nonce fields a block explorer's `get_transaction_receipt` needs,
/// rather than the bare verify/settle-call response shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X402Receipt {
    pub tx_hash: B256,
    pub success: bool,
    pub payer: Address,
    pub recipient: Address,
    pub amount: U256,
    pub nonce: B256,
    pub error_reason: Option<ErrorReason>,
}

impl X402Receipt {
    pub fn success(tx_hash: B256, payer: Address, recipient: Address, amount: U256, nonce: B256) -> Self {
        X402Receipt {
            tx_hash,
            success: true,
            payer,
            recipient,
            amount,
            nonce,
            error_reason: None,
        }
    }

    pub fn failure(
        tx_hash: B256,
        payer: Address,
        recipient: Address,
        amount: U256,
        nonce: B256,
        reason: ErrorReason,
    ) -> Self {
        X402Receipt {
            tx_hash,
            success: false,
            payer,
            recipient,
            amount,
            nonce,
            error_reason: Some(reason),
        }
    }
}
