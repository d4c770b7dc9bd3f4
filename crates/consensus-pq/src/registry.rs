//! The Validator PQ Key Registry (spec §3): `address -> {algorithm, public_key,
//! backup_public_key, generated_at_block, expiry_block}`, guarded by a single `RwLock`
//! because reads dominate and rotation is a write (spec §5).

use std::collections::HashMap;
use std::sync::RwLock;

use alloy_primitives::Address;
use splendor_pq_crypto::MlDsaAlgorithm;

/// Rotation interval, in blocks, absent an explicit `expiry_block` on registration
/// (spec §3 "rotated automatically... rotation interval ~100,000 blocks").
pub const DEFAULT_ROTATION_INTERVAL_BLOCKS: u64 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PqKeyEntry {
    pub algorithm: MlDsaAlgorithm,
    pub public_key: Vec<u8>,
    pub backup_public_key: Option<Vec<u8>>,
    pub generated_at_block: u64,
    pub expiry_block: u64,
}

/// Registry owns the keys; rotation is scheduled via each entry's `expiry_block`, not a
/// separate index, so there's no back-pointer cycle between registry and key material
/// (spec §9 "Cycles and back-pointers").
#[derive(Debug, Default)]
pub struct PqKeyRegistry {
    entries: RwLock<HashMap<Address, PqKeyEntry>>,
}

impl PqKeyRegistry {
    pub fn new() -> Self {
        PqKeyRegistry::default()
    }

    /// Registers or replaces a validator's PQ key (spec §3 "registered by governance tx").
    pub fn register(&self, validator: Address, entry: PqKeyEntry) {
        self.entries.write().expect("registry lock poisoned").insert(validator, entry);
    }

    /// Returns the validator's current key, rotating it out (returning `None`) if
    /// `current_block >= expiry_block` and no backup key is configured to promote.
    ///
    /// If a backup key is present, rotation promotes it to primary and clears the backup
    /// rather than leaving the validator keyless.
    pub fn current_key(&self, validator: &Address, current_block: u64) -> Option<PqKeyEntry> {
        let needs_rotation = {
            let entries = self.entries.read().expect("registry lock poisoned");
            entries
                .get(validator)
                .is_some_and(|entry| current_block >= entry.expiry_block)
        };

        if needs_rotation {
            self.rotate(validator, current_block);
        }

        self.entries.read().expect("registry lock poisoned").get(validator).cloned()
    }

    fn rotate(&self, validator: &Address, current_block: u64) {
        let mut entries = self.entries.write().expect("registry lock poisoned");
        let Some(entry) = entries.get_mut(validator) else {
            return;
        };
        if current_block < entry.expiry_block {
            return;
        }
        match entry.backup_public_key.take() {
            Some(backup) => {
                entry.public_key = backup;
                entry.generated_at_block = current_block;
                entry.expiry_block = current_block + DEFAULT_ROTATION_INTERVAL_BLOCKS;
            }
            None => {
                entries.remove(validator);
            }
        }
    }

    /// Clears all registered keys (spec §3 "wiped on node shutdown").
    pub fn clear(&self) {
        self.entries.write().expect("registry lock poisoned").clear();
    }
}
