//! The `(from, nonce)` anti-replay registry.
//!
//! Per §6.6, the authoritative copy lives in chain state under a reserved system address,
//! keyed by `keccak256(from || nonce)`. [`AntiReplayRegistry`] is that mapping's in-memory
//! stand-in (the chain-data database itself is out of scope); [`AntiReplayRegistry::key_for`]
//! computes the same key a real on-chain store would use, so swapping the backing store later
//! doesn't change which key gets written.

use alloy_primitives::{Address, B256, keccak256};
use dashmap::DashSet;

use splendor_x402_types::HexEncodedNonce;

/// Reserved 20-byte system address anti-replay entries are persisted under.
pub const ANTI_REPLAY_SYSTEM_ADDRESS: Address = Address::new([0xff; 20]);

#[derive(Debug, Default)]
pub struct AntiReplayRegistry {
    consumed: DashSet<B256>,
}

impl AntiReplayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `keccak256(from || nonce)`, the storage key under [`ANTI_REPLAY_SYSTEM_ADDRESS`].
    pub fn key_for(from: Address, nonce: &HexEncodedNonce) -> B256 {
        let mut buf = [0u8; 52];
        buf[..20].copy_from_slice(from.as_slice());
        buf[20..].copy_from_slice(&nonce.0);
        keccak256(buf)
    }

    pub fn contains(&self, from: Address, nonce: &HexEncodedNonce) -> bool {
        self.consumed.contains(&Self::key_for(from, nonce))
    }

    /// Records `(from, nonce)` as consumed. Returns `false` if it was already present —
    /// callers must treat that as `NonceReused` rather than silently succeeding.
    pub fn record(&self, from: Address, nonce: &HexEncodedNonce) -> bool {
        self.consumed.insert(Self::key_for(from, nonce))
    }
}
