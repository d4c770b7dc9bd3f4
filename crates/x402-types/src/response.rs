//! Responses returned by the verify/settle operations, and the error taxonomy they report.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use splendor_core::network::Network;

/// Validation failure reasons, in the order §4.5 checks them. Recoverable: returned to the
/// caller as a string, never panics or aborts a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    UnsupportedScheme,
    UnsupportedNetwork,
    NotYetValid,
    Expired,
    InvalidSignature,
    InsufficientBalance,
    AmountMismatch,
    RecipientMismatch,
    NonceReused,
}

impl std::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorReason::UnsupportedScheme => "unsupported_scheme",
            ErrorReason::UnsupportedNetwork => "unsupported_network",
            ErrorReason::NotYetValid => "not_yet_valid",
            ErrorReason::Expired => "expired",
            ErrorReason::InvalidSignature => "invalid_signature",
            ErrorReason::InsufficientBalance => "insufficient_balance",
            ErrorReason::AmountMismatch => "amount_mismatch",
            ErrorReason::RecipientMismatch => "recipient_mismatch",
            ErrorReason::NonceReused => "nonce_reused",
        };
        write!(f, "{s}")
    }
}

/// Result of `x402_verify`. Does not mutate state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<ErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<Address>,
}

impl VerifyResponse {
    pub fn valid(payer: Address) -> Self {
        VerifyResponse {
            is_valid: true,
            invalid_reason: None,
            payer: Some(payer),
        }
    }

    pub fn invalid(reason: ErrorReason, payer: Option<Address>) -> Self {
        VerifyResponse {
            is_valid: false,
            invalid_reason: Some(reason),
            payer,
        }
    }
}

/// Result of `x402_settle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<ErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<B256>,
    pub network: Network,
}

impl SettleResponse {
    pub fn success(payer: Address, transaction: B256, network: Network) -> Self {
        SettleResponse {
            success: true,
            error_reason: None,
            payer: Some(payer),
            transaction: Some(transaction),
            network,
        }
    }

    pub fn failure(reason: ErrorReason, network: Network) -> Self {
        SettleResponse {
            success: false,
            error_reason: Some(reason),
            payer: None,
            transaction: None,
            network,
        }
    }
}
