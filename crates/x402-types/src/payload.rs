//! A signed payment authorization from the buyer, and the hex-encoded wire primitives
//! it's made of.

use alloy_primitives::{Address, U256};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use splendor_core::network::Network;
use splendor_core::timestamp::UnixTimestamp;

use crate::requirements::ExactScheme;

/// A 65-byte `{r:32, s:32, v:1}` ECDSA signature, hex-encoded with a `0x` prefix.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EvmSignature(pub [u8; 65]);

static SIG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{130}$").expect("valid regex"));

impl<'de> Deserialize<'de> for EvmSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if !SIG_REGEX.is_match(&s) {
            return Err(DeError::custom(
                "invalid EVM signature: must be 0x-prefixed and 130 hex chars",
            ));
        }
        let bytes =
            hex::decode(&s[2..]).map_err(|_| DeError::custom("invalid hex in signature"))?;
        let array: [u8; 65] = bytes
            .try_into()
            .map_err(|_| DeError::custom("signature must be exactly 65 bytes"))?;
        Ok(EvmSignature(array))
    }
}

impl Serialize for EvmSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

/// A 32-byte anti-replay nonce, hex-encoded with a `0x` prefix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HexEncodedNonce(pub [u8; 32]);

static NONCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("valid regex"));

impl<'de> Deserialize<'de> for HexEncodedNonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if !NONCE_REGEX.is_match(&s) {
            return Err(DeError::custom("invalid nonce format"));
        }
        let bytes = hex::decode(&s[2..]).map_err(|_| DeError::custom("invalid hex in nonce"))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| DeError::custom("nonce must be exactly 32 bytes"))?;
        Ok(HexEncodedNonce(array))
    }
}

impl Serialize for HexEncodedNonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

/// The scheme-specific signed content of a payment payload.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactPayload {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub valid_after: UnixTimestamp,
    pub valid_before: UnixTimestamp,
    pub nonce: HexEncodedNonce,
    pub signature: EvmSignature,
}

/// A signed request to transfer `value` from `from` to `to`, within the window
/// `[valid_after, valid_before]`.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub x402_version: u8,
    pub scheme: ExactScheme,
    pub network: Network,
    pub payload: ExactPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_round_trips() {
        let nonce = HexEncodedNonce([0x42; 32]);
        let json = serde_json::to_string(&nonce).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "42".repeat(32)));
        let back: HexEncodedNonce = serde_json::from_str(&json).unwrap();
        assert_eq!(back, nonce);
    }

    #[test]
    fn signature_rejects_wrong_length() {
        let short = "\"0x1234\"";
        assert!(serde_json::from_str::<EvmSignature>(short).is_err());
    }

    #[test]
    fn signature_round_trips() {
        let sig = EvmSignature([7u8; 65]);
        let json = serde_json::to_string(&sig).unwrap();
        let back: EvmSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }
}
