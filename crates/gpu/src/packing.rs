//! Fixed-width slot packing for GPU batch descriptors (spec §3 "GPU Batch Descriptor", §4.2
//! "Packing formats").
//!
//! Items are packed into fixed-width byte slots plus a parallel `u32` length so the
//! accelerator entry-point (a flat, C-ABI-shaped call in a real build) sees uniform strides.
//! An item longer than its slot is truncated to the slot width and the truncation is
//! recorded in statistics (spec §4.2 "Tie-breaks and edge cases").

pub const HASH_SLOT_WIDTH: usize = 256;
pub const TX_SLOT_WIDTH: usize = 1024;

/// One packed slot: up to `WIDTH` bytes of payload, and the original (possibly truncated)
/// length.
#[derive(Debug, Clone)]
pub struct PackedSlot<const WIDTH: usize> {
    pub bytes: [u8; WIDTH],
    pub length: u32,
}

/// Packs `input` into a fixed-width slot, truncating if it doesn't fit. Returns the slot and
/// whether truncation occurred.
pub fn pack_slot<const WIDTH: usize>(input: &[u8]) -> (PackedSlot<WIDTH>, bool) {
    let mut bytes = [0u8; WIDTH];
    let truncated = input.len() > WIDTH;
    let take = input.len().min(WIDTH);
    bytes[..take].copy_from_slice(&input[..take]);
    (
        PackedSlot {
            bytes,
            length: take as u32,
        },
        truncated,
    )
}

/// Recovers the (possibly truncated) payload from a packed slot.
pub fn unpack_slot<const WIDTH: usize>(slot: &PackedSlot<WIDTH>) -> Vec<u8> {
    let len = (slot.length as usize).min(WIDTH);
    slot.bytes[..len].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_then_unpack_preserves_short_items() {
        let input = b"a short item";
        let (slot, truncated) = pack_slot::<HASH_SLOT_WIDTH>(input);
        assert!(!truncated);
        assert_eq!(unpack_slot(&slot), input);
    }

    #[test]
    fn pack_truncates_oversized_items() {
        let input = vec![0x42u8; HASH_SLOT_WIDTH + 50];
        let (slot, truncated) = pack_slot::<HASH_SLOT_WIDTH>(&input);
        assert!(truncated);
        assert_eq!(slot.length as usize, HASH_SLOT_WIDTH);
        assert_eq!(unpack_slot(&slot), input[..HASH_SLOT_WIDTH]);
    }

    #[test]
    fn empty_item_round_trips_to_empty() {
        let (slot, truncated) = pack_slot::<TX_SLOT_WIDTH>(&[]);
        assert!(!truncated);
        assert!(unpack_slot(&slot).is_empty());
    }
}
