//! Canonical x402 message construction and signature recovery.
//!
//! A payer signs a short, human-auditable string rather than raw transaction bytes. The
//! node hashes it with the standard "Ethereum Signed Message" prefix (EIP-191) and recovers
//! the signer with `secp256k1` ECDSA, the same primitive `alloy_primitives` already pulls in
//! for address handling elsewhere in the workspace.

use alloy_primitives::{Address, B256, Signature, keccak256};

use crate::payload::ExactPayload;

/// Builds the v2 canonical message (chain-id bound) for a payment payload.
pub fn canonical_message_v2(payload: &ExactPayload, chain_id: u64) -> String {
    format!(
        "x402-payment:{:#x}:{:#x}:{:#x}:{}:{}:{:#x}:{}",
        payload.from,
        payload.to,
        payload.value,
        payload.valid_after,
        payload.valid_before,
        B256::from(payload.nonce.0),
        chain_id,
    )
}

/// Builds the legacy v1 canonical message (no chain id).
pub fn canonical_message_v1(payload: &ExactPayload) -> String {
    format!(
        "x402-payment:{:#x}:{:#x}:{:#x}:{}:{}:{:#x}",
        payload.from,
        payload.to,
        payload.value,
        payload.valid_after,
        payload.valid_before,
        B256::from(payload.nonce.0),
    )
}

/// Returns the v2 canonical message; callers needing the v1 fallback call
/// [`canonical_message_v1`] directly. Kept as a convenience for the common case.
pub fn canonical_message(payload: &ExactPayload, chain_id: u64) -> String {
    canonical_message_v2(payload, chain_id)
}

/// Hashes `message` with the EIP-191 "Ethereum Signed Message" prefix.
fn eip191_hash(message: &str) -> B256 {
    let prefixed = format!("\x19Ethereum Signed Message:\n{}{}", message.len(), message);
    keccak256(prefixed.as_bytes())
}

#[derive(Debug, thiserror::Error)]
pub enum RecoverError {
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
    #[error("signature did not recover to any address")]
    RecoveryFailed,
}

/// Recovers the signer of `payload`'s `signature`, trying the v2 (chain-id-bound) canonical
/// message first and falling back to the legacy v1 message, per §6.3.
pub fn recover_signer(payload: &ExactPayload, chain_id: u64) -> Result<Address, RecoverError> {
    let signature = Signature::from_raw_array(&payload.signature.0)
        .map_err(|e| RecoverError::MalformedSignature(e.to_string()))?;

    let v2_hash = eip191_hash(&canonical_message_v2(payload, chain_id));
    if let Ok(address) = signature.recover_address_from_prehash(&v2_hash) {
        return Ok(address);
    }

    let v1_hash = eip191_hash(&canonical_message_v1(payload));
    signature
        .recover_address_from_prehash(&v1_hash)
        .map_err(|_| RecoverError::RecoveryFailed)
}
