//! PQ seal verify/produce algorithms (spec §4.4).

use alloy_primitives::{Address, keccak256};
use splendor_pq_crypto::MlDsaAlgorithm;

use crate::error::ConsensusError;
use crate::fork::{ForkState, fork_state};
use crate::header::{HeaderExtra, PqSeal};
use crate::validator_set::{ValidatorSetView, recency_bound};

/// Derives the PQ signer address as the last 20 bytes of keccak-256 over the public key
/// (spec §4.4 "Derive PQ signer address").
pub fn derive_pq_signer(public_key: &[u8]) -> Address {
    Address::from_slice(&keccak256(public_key)[12..])
}

/// Verifies a header's PQ seal, if any, against the fork schedule and authorised validator
/// set (spec §4.4 "Verify algorithm").
///
/// `seal_hash` is the base consensus's seal hash, recomputed by the caller exactly as that
/// consensus defines it (excluding the PQ and ECDSA seal bytes themselves, spec §6.1) —
/// recomputing that hash is the base consensus's responsibility, out of scope here.
pub fn verify_header(
    extra: &HeaderExtra,
    block: u64,
    fork_block: Option<u64>,
    transition_blocks: u64,
    seal_hash: [u8; 32],
    ecdsa_recovered_signer: Option<Address>,
    validator_set: &dyn ValidatorSetView,
) -> Result<(), ConsensusError> {
    let state = fork_state(block, fork_block, transition_blocks);
    if matches!(state, ForkState::PreFork) {
        return Ok(());
    }

    let Some(seal) = &extra.pq_seal else {
        return if matches!(state, ForkState::PostFork) {
            Err(ConsensusError::MissingPQSeal { block })
        } else {
            Ok(())
        };
    };

    splendor_pq_crypto::verify(seal.algorithm, &seal_hash, &seal.signature, &seal.public_key)?;

    let pq_signer = derive_pq_signer(&seal.public_key);

    if matches!(state, ForkState::DualSigning) {
        if let Some(ecdsa_signer) = ecdsa_recovered_signer {
            if ecdsa_signer != pq_signer {
                return Err(ConsensusError::SignerMismatch {
                    ecdsa: ecdsa_signer,
                    pq: pq_signer,
                });
            }
        }
    }

    if !validator_set.is_authorised(&pq_signer) {
        return Err(ConsensusError::UnauthorisedSigner(pq_signer));
    }

    let bound = recency_bound(validator_set.signer_count());
    if let Some(last_signed) = validator_set.last_signed_block(&pq_signer) {
        if block.saturating_sub(last_signed) <= bound {
            return Err(ConsensusError::RecencyViolation {
                signer: pq_signer,
                bound,
            });
        }
    }

    Ok(())
}

/// Produces a PQ seal over `seal_hash` under the local signer's `(public_key, secret_key)`
/// and splices it into `extra` immediately before the ECDSA seal, which remains the final 65
/// bytes (spec §4.4 "Seal algorithm").
pub fn seal_block(
    mut extra: HeaderExtra,
    seal_hash: [u8; 32],
    algorithm: MlDsaAlgorithm,
    public_key: &[u8],
    secret_key: &[u8],
) -> Result<HeaderExtra, ConsensusError> {
    let signature = splendor_pq_crypto::sign(algorithm, &seal_hash, secret_key)?;
    extra.pq_seal = Some(PqSeal {
        algorithm,
        signature,
        public_key: public_key.to_vec(),
    });
    // Validate size before returning; `encode` is also how the caller serialises the result.
    extra.encode().map(|_| extra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{ECDSA_SEAL_LEN, VANITY_LEN};
    use crate::validator_set::InMemoryValidatorSet;

    fn seal_hash() -> [u8; 32] {
        *keccak256(b"splendor seal hash fixture")
    }

    fn sealed_extra(algorithm: MlDsaAlgorithm, public_key: Vec<u8>, signature: Vec<u8>) -> HeaderExtra {
        HeaderExtra {
            vanity: [0u8; VANITY_LEN],
            signers: None,
            pq_seal: Some(PqSeal {
                algorithm,
                signature,
                public_key,
            }),
            ecdsa_seal: [0u8; ECDSA_SEAL_LEN],
        }
    }

    #[test]
    fn pre_fork_block_succeeds_without_checking_pq() {
        let extra = HeaderExtra {
            vanity: [0u8; VANITY_LEN],
            signers: None,
            pq_seal: None,
            ecdsa_seal: [0u8; ECDSA_SEAL_LEN],
        };
        let validator_set = InMemoryValidatorSet::new(vec![]);
        let result = verify_header(&extra, 10, Some(100), 50, seal_hash(), None, &validator_set);
        assert!(result.is_ok());
    }

    #[test]
    fn post_fork_block_without_pq_seal_is_missing_pq_seal() {
        let extra = HeaderExtra {
            vanity: [0u8; VANITY_LEN],
            signers: None,
            pq_seal: None,
            ecdsa_seal: [0u8; ECDSA_SEAL_LEN],
        };
        let validator_set = InMemoryValidatorSet::new(vec![]);
        let result = verify_header(&extra, 150, Some(100), 50, seal_hash(), None, &validator_set);
        assert!(matches!(result, Err(ConsensusError::MissingPQSeal { block: 150 })));
    }

    #[cfg(feature = "pqcrypto")]
    #[test]
    fn post_fork_block_with_valid_matching_seal_succeeds() {
        let algorithm = MlDsaAlgorithm::MlDsa65;
        let (pk, sk) = splendor_pq_crypto::generate(algorithm).unwrap();
        let hash = seal_hash();
        let signature = splendor_pq_crypto::sign(algorithm, &hash, &sk).unwrap();
        let signer = derive_pq_signer(&pk);

        let mut validator_set = InMemoryValidatorSet::new(vec![signer]);
        validator_set.record_signed(signer, 0);

        let extra = sealed_extra(algorithm, pk, signature);
        let result = verify_header(&extra, 150, Some(100), 50, hash, Some(signer), &validator_set);
        assert!(result.is_ok(), "{result:?}");
    }

    #[cfg(feature = "pqcrypto")]
    #[test]
    fn dual_signing_signer_mismatch_is_rejected() {
        let algorithm = MlDsaAlgorithm::MlDsa65;
        let (pk, sk) = splendor_pq_crypto::generate(algorithm).unwrap();
        let hash = seal_hash();
        let signature = splendor_pq_crypto::sign(algorithm, &hash, &sk).unwrap();
        let pq_signer = derive_pq_signer(&pk);
        let other = Address::repeat_byte(0x09);

        let validator_set = InMemoryValidatorSet::new(vec![pq_signer]);
        let extra = sealed_extra(algorithm, pk, signature);
        let result = verify_header(&extra, 110, Some(100), 50, hash, Some(other), &validator_set);
        assert!(matches!(result, Err(ConsensusError::SignerMismatch { .. })));
    }

    #[cfg(feature = "pqcrypto")]
    #[test]
    fn seal_block_produces_a_header_that_verify_header_accepts() {
        let algorithm = MlDsaAlgorithm::MlDsa65;
        let (pk, sk) = splendor_pq_crypto::generate(algorithm).unwrap();
        let hash = seal_hash();
        let signer = derive_pq_signer(&pk);

        let unsealed = HeaderExtra {
            vanity: [0u8; VANITY_LEN],
            signers: None,
            pq_seal: None,
            ecdsa_seal: [0u8; ECDSA_SEAL_LEN],
        };
        let sealed = seal_block(unsealed, hash, algorithm, &pk, &sk).unwrap();
        assert_eq!(&sealed.ecdsa_seal, &[0u8; ECDSA_SEAL_LEN]);

        let validator_set = InMemoryValidatorSet::new(vec![signer]);
        let result = verify_header(&sealed, 150, Some(100), 50, hash, Some(signer), &validator_set);
        assert!(result.is_ok(), "{result:?}");
    }

    #[cfg(feature = "pqcrypto")]
    #[test]
    fn signer_who_sealed_too_recently_is_rejected() {
        let algorithm = MlDsaAlgorithm::MlDsa65;
        let (pk, sk) = splendor_pq_crypto::generate(algorithm).unwrap();
        let hash = seal_hash();
        let signature = splendor_pq_crypto::sign(algorithm, &hash, &sk).unwrap();
        let signer = derive_pq_signer(&pk);

        let mut validator_set = InMemoryValidatorSet::new(vec![signer]);
        validator_set.record_signed(signer, 148); // within recency_bound(1) == 1 of block 149

        let extra = sealed_extra(algorithm, pk, signature);
        let result = verify_header(&extra, 149, Some(100), 50, hash, Some(signer), &validator_set);
        assert!(matches!(result, Err(ConsensusError::RecencyViolation { .. })));
    }
}
