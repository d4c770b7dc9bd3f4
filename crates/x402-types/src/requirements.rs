//! Payment requirements: the terms a seller publishes in a `402 Payment Required` response.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use url::Url;

use splendor_core::network::Network;
use splendor_core::lit_str;

lit_str!(ExactScheme, "exact");

/// Terms under which a payment will be accepted.
///
/// `asset == Address::ZERO` denotes the chain's native coin rather than an ERC-20 token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Always `"exact"` on the wire; the only scheme this node implements.
    pub scheme: ExactScheme,
    pub network: Network,
    pub max_amount_required: U256,
    pub resource: Url,
    pub description: String,
    pub mime_type: String,
    pub pay_to: Address,
    pub max_timeout_seconds: u64,
    /// `Address::ZERO` for the native coin.
    pub asset: Address,
}

impl PaymentRequirements {
    pub fn is_native_asset(&self) -> bool {
        self.asset == Address::ZERO
    }
}
