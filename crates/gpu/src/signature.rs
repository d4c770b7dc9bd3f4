//! Batched secp256k1 signature verification (spec §4.2 `submit_signatures`).
//!
//! Each item carries a 65-byte `{r:32, s:32, v:1}` signature, a 32-byte message digest, and
//! a public key. `v` is accepted but not used here — verification is against a known public
//! key, not recovery — so only `r`/`s` feed the curve check.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature as K256Signature, VerifyingKey};

/// One item in a signature-verification batch.
pub struct SignatureItem<'a> {
    pub signature: &'a [u8],
    pub message: &'a [u8],
    pub public_key: &'a [u8],
}

/// Verifies each item, returning `true`/`false` rather than failing the whole batch on one
/// bad item (spec §4.2 "mismatched key length... other lengths mark item invalid rather
/// than abort").
pub fn compute(items: &[SignatureItem<'_>]) -> Vec<bool> {
    items.iter().map(|item| verify_one(item)).collect()
}

fn verify_one(item: &SignatureItem<'_>) -> bool {
    let Some(verifying_key) = decode_public_key(item.public_key) else {
        return false;
    };
    if item.signature.len() != 65 || item.message.len() != 32 {
        return false;
    }
    let Ok(signature) = K256Signature::from_slice(&item.signature[..64]) else {
        return false;
    };
    verifying_key
        .verify_prehash(item.message, &signature)
        .is_ok()
}

/// Accepts a 65-byte uncompressed SEC1 key, or a 64-byte raw key with the `0x04` uncompressed
/// tag prepended (spec §4.2).
fn decode_public_key(bytes: &[u8]) -> Option<VerifyingKey> {
    match bytes.len() {
        65 => VerifyingKey::from_sec1_bytes(bytes).ok(),
        64 => {
            let mut tagged = [0u8; 65];
            tagged[0] = 0x04;
            tagged[1..].copy_from_slice(bytes);
            VerifyingKey::from_sec1_bytes(&tagged).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;
    use k256::ecdsa::{Signature as K256Signature, SigningKey};

    fn sample() -> (SigningKey, [u8; 32], K256Signature) {
        let signing_key = SigningKey::from_bytes(&[0x07u8; 32].into()).expect("valid key");
        let message = *keccak256(b"gpu signature batch item");
        let (sig, _recid): (K256Signature, _) = {
            use k256::ecdsa::signature::hazmat::PrehashSigner;
            signing_key.sign_prehash(&message).expect("sign")
        };
        (signing_key, message, sig)
    }

    #[test]
    fn verifies_valid_signature_with_uncompressed_key() {
        let (signing_key, message, sig) = sample();
        let uncompressed = signing_key.verifying_key().to_encoded_point(false);
        let item = SignatureItem {
            signature: &{
                let mut buf = [0u8; 65];
                buf[..64].copy_from_slice(&sig.to_bytes());
                buf[64] = 27;
                buf
            },
            message: &message,
            public_key: uncompressed.as_bytes(),
        };
        assert_eq!(compute(&[item]), vec![true]);
    }

    #[test]
    fn accepts_raw_64_byte_key_by_prepending_tag() {
        let (signing_key, message, sig) = sample();
        let uncompressed = signing_key.verifying_key().to_encoded_point(false);
        let raw = &uncompressed.as_bytes()[1..];
        let mut signature_bytes = [0u8; 65];
        signature_bytes[..64].copy_from_slice(&sig.to_bytes());
        signature_bytes[64] = 27;

        let item = SignatureItem {
            signature: &signature_bytes,
            message: &message,
            public_key: raw,
        };
        assert_eq!(compute(&[item]), vec![true]);
    }

    #[test]
    fn rejects_tampered_message() {
        let (signing_key, _message, sig) = sample();
        let uncompressed = signing_key.verifying_key().to_encoded_point(false);
        let mut signature_bytes = [0u8; 65];
        signature_bytes[..64].copy_from_slice(&sig.to_bytes());
        signature_bytes[64] = 27;

        let item = SignatureItem {
            signature: &signature_bytes,
            message: &[0u8; 32],
            public_key: uncompressed.as_bytes(),
        };
        assert_eq!(compute(&[item]), vec![false]);
    }

    #[test]
    fn marks_item_invalid_on_bad_key_length_instead_of_aborting() {
        let item = SignatureItem {
            signature: &[0u8; 65],
            message: &[0u8; 32],
            public_key: &[0u8; 20],
        };
        assert_eq!(compute(&[item]), vec![false]);
    }
}
