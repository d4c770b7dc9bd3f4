//! The Splendor network identity.
//!
//! Unlike a multi-chain facilitator, this node serves exactly one EVM-compatible network:
//! its own chain. [`Network`] exists as a thin wrapper rather than a bare `u64` so config,
//! RPC responses and CAIP-2-shaped identifiers all agree on one spelling.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The Splendor network. A single variant today; kept as an enum so a future testnet/mainnet
/// split (mirroring how most EVM chains version themselves) doesn't reshape every call site.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    #[serde(rename = "splendor")]
    Splendor,
}

impl Default for Network {
    fn default() -> Self {
        Network::Splendor
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Splendor => write!(f, "splendor"),
        }
    }
}

impl Network {
    /// The chain ID this node reports over JSON-RPC and embeds in replay-protected signatures.
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Splendor => 6402,
        }
    }

    /// CAIP-2 style identifier, e.g. `eip155:6402`.
    pub fn caip2(&self) -> String {
        format!("eip155:{}", self.chain_id())
    }

    pub fn variants() -> &'static [Network] {
        &[Network::Splendor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_is_stable() {
        assert_eq!(Network::Splendor.chain_id(), 6402);
    }

    #[test]
    fn caip2_format() {
        assert_eq!(Network::Splendor.caip2(), "eip155:6402");
    }

    #[test]
    fn serializes_as_lowercase_tag() {
        let json = serde_json::to_string(&Network::Splendor).unwrap();
        assert_eq!(json, "\"splendor\"");
    }
}
