//! Authorised-signer-set and recency-bound checks (spec §4.4), modeled as a narrow trait
//! standing in for the out-of-scope chain-database collaborator.

use alloy_primitives::Address;

/// A snapshot of the authorised validator set as of a given parent block.
pub trait ValidatorSetView {
    /// Whether `address` is in the authorised set.
    fn is_authorised(&self, address: &Address) -> bool;

    /// Number of authorised signers, used for the recency bound `⌊|signers|/2⌋+1`.
    fn signer_count(&self) -> usize;

    /// The most recent block at which `address` signed, if any.
    fn last_signed_block(&self, address: &Address) -> Option<u64>;
}

/// The recency bound: a signer may not sign again within this many blocks of its last seal
/// (spec §4.4).
pub fn recency_bound(signer_count: usize) -> u64 {
    (signer_count / 2) as u64 + 1
}

/// In-memory validator set for tests and the reference node binary.
#[derive(Debug, Default, Clone)]
pub struct InMemoryValidatorSet {
    authorised: Vec<Address>,
    last_signed: std::collections::HashMap<Address, u64>,
}

impl InMemoryValidatorSet {
    pub fn new(authorised: Vec<Address>) -> Self {
        InMemoryValidatorSet {
            authorised,
            last_signed: std::collections::HashMap::new(),
        }
    }

    /// Records that `address` sealed block `n`, for future recency checks.
    pub fn record_signed(&mut self, address: Address, block: u64) {
        self.last_signed.insert(address, block);
    }
}

impl ValidatorSetView for InMemoryValidatorSet {
    fn is_authorised(&self, address: &Address) -> bool {
        self.authorised.contains(address)
    }

    fn signer_count(&self) -> usize {
        self.authorised.len()
    }

    fn last_signed_block(&self, address: &Address) -> Option<u64> {
        self.last_signed.get(address).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recency_bound_matches_spec_formula() {
        assert_eq!(recency_bound(4), 3);
        assert_eq!(recency_bound(5), 3);
        assert_eq!(recency_bound(1), 1);
        assert_eq!(recency_bound(0), 1);
    }

    #[test]
    fn tracks_authorisation_and_last_signed_block() {
        let addr = Address::repeat_byte(0x01);
        let mut set = InMemoryValidatorSet::new(vec![addr]);
        assert!(set.is_authorised(&addr));
        assert!(!set.is_authorised(&Address::repeat_byte(0x02)));
        assert_eq!(set.last_signed_block(&addr), None);
        set.record_signed(addr, 42);
        assert_eq!(set.last_signed_block(&addr), Some(42));
    }
}
