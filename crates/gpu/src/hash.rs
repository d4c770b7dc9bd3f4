//! Keccak-256 hash batches (spec §4.2 `submit_hashes`).

use alloy_primitives::keccak256;

use crate::packing::{HASH_SLOT_WIDTH, pack_slot};

/// Hashes each input with keccak-256, truncating any input longer than the hash slot width
/// to the slot before hashing — matching what the accelerator path would see after packing.
pub fn compute(inputs: &[Vec<u8>]) -> (Vec<[u8; 32]>, usize) {
    let mut truncated_count = 0;
    let digests = inputs
        .iter()
        .map(|input| {
            let (slot, truncated) = pack_slot::<HASH_SLOT_WIDTH>(input);
            if truncated {
                truncated_count += 1;
            }
            let len = slot.length as usize;
            *keccak256(&slot.bytes[..len])
        })
        .collect();
    (digests, truncated_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_keccak256_for_short_inputs() {
        let inputs = vec![b"abc".to_vec(), Vec::new()];
        let (digests, truncated) = compute(&inputs);
        assert_eq!(truncated, 0);
        assert_eq!(digests[0], *keccak256(b"abc"));
        assert_eq!(digests[1], *keccak256(b""));
    }

    #[test]
    fn truncates_oversized_inputs_before_hashing() {
        let oversized = vec![0xABu8; HASH_SLOT_WIDTH + 10];
        let (digests, truncated) = compute(&[oversized.clone()]);
        assert_eq!(truncated, 1);
        assert_eq!(digests[0], *keccak256(&oversized[..HASH_SLOT_WIDTH]));
    }
}
