//! Block-header extra-field layout and the PQ seal TLV (spec §3, §6.1).
//!
//! `[vanity:32] [signers?:N*20 on checkpoint] [pq_seal?:TLV] [ecdsa_seal:65]`. Manual,
//! bounds-checked byte slicing rather than a derive macro, in the style of the retrieval
//! pack's hand-rolled consensus header/seal modules — malformed input returns a
//! [`ConsensusError`] instead of panicking.

use alloy_primitives::Address;
use splendor_pq_crypto::MlDsaAlgorithm;

use crate::error::ConsensusError;

pub const VANITY_LEN: usize = 32;
pub const ADDRESS_LEN: usize = 20;
pub const ECDSA_SEAL_LEN: usize = 65;
const TLV_HEADER_LEN: usize = 1 + 4 + 4;

/// Hard ceiling on the header extra field: one vanity, a generous validator checkpoint list,
/// one ML-DSA-65 seal (the largest of the three variants) plus key, and the ECDSA seal
/// (spec §3 "sized to accommodate one ML-DSA-65 signature (~3309 bytes) plus key (~1952
/// bytes) plus validator list"). The validator list cap (256 signers) is an implementation
/// choice not specified by name upstream; see DESIGN.md.
pub const MAX_EXTRA_LEN: usize = VANITY_LEN + 256 * ADDRESS_LEN + TLV_HEADER_LEN + 3309 + 1952 + ECDSA_SEAL_LEN;

/// The ML-DSA seal embedded in a header extra field, decoded from its TLV encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PqSeal {
    pub algorithm: MlDsaAlgorithm,
    pub signature: Vec<u8>,
    pub public_key: Vec<u8>,
}

impl PqSeal {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TLV_HEADER_LEN + self.signature.len() + self.public_key.len());
        out.push(self.algorithm.tlv_type());
        out.extend_from_slice(&(self.signature.len() as u32).to_be_bytes());
        out.extend_from_slice(&(self.public_key.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.signature);
        out.extend_from_slice(&self.public_key);
        out
    }

    /// Decodes a TLV from the front of `bytes`, requiring the whole slice to be consumed
    /// exactly (spec §8 round-trip law: "encode-then-decode returns the original").
    pub fn decode(bytes: &[u8]) -> Result<Self, ConsensusError> {
        if bytes.len() < TLV_HEADER_LEN {
            return Err(ConsensusError::MalformedExtra("PQ seal TLV shorter than its header"));
        }
        let algorithm = MlDsaAlgorithm::from_tlv_type(bytes[0])
            .ok_or(ConsensusError::MalformedExtra("unknown PQ seal TLV type byte"))?;
        let sig_len = u32::from_be_bytes(bytes[1..5].try_into().unwrap()) as usize;
        let pk_len = u32::from_be_bytes(bytes[5..9].try_into().unwrap()) as usize;
        let expected_total = TLV_HEADER_LEN + sig_len + pk_len;
        if bytes.len() != expected_total {
            return Err(ConsensusError::MalformedExtra("PQ seal TLV length does not match sig_len/pk_len"));
        }
        let signature = bytes[TLV_HEADER_LEN..TLV_HEADER_LEN + sig_len].to_vec();
        let public_key = bytes[TLV_HEADER_LEN + sig_len..].to_vec();
        Ok(PqSeal {
            algorithm,
            signature,
            public_key,
        })
    }
}

/// A parsed block-header extra field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderExtra {
    pub vanity: [u8; VANITY_LEN],
    pub signers: Option<Vec<Address>>,
    pub pq_seal: Option<PqSeal>,
    pub ecdsa_seal: [u8; ECDSA_SEAL_LEN],
}

impl HeaderExtra {
    /// Encodes the extra field, returning [`ConsensusError::ExtraTooLarge`] if the result
    /// would exceed [`MAX_EXTRA_LEN`] (spec §4.4 "Seal algorithm").
    pub fn encode(&self) -> Result<Vec<u8>, ConsensusError> {
        let mut out = Vec::with_capacity(MAX_EXTRA_LEN);
        out.extend_from_slice(&self.vanity);
        if let Some(signers) = &self.signers {
            for signer in signers {
                out.extend_from_slice(signer.as_slice());
            }
        }
        if let Some(seal) = &self.pq_seal {
            out.extend_from_slice(&seal.encode());
        }
        out.extend_from_slice(&self.ecdsa_seal);
        if out.len() > MAX_EXTRA_LEN {
            return Err(ConsensusError::ExtraTooLarge);
        }
        Ok(out)
    }

    /// Decodes an extra field. `signer_count` must be `Some(n)` for checkpoint blocks (the
    /// caller determines checkpoint-ness; it is not self-describing in the byte layout).
    pub fn decode(bytes: &[u8], signer_count: Option<usize>) -> Result<Self, ConsensusError> {
        if bytes.len() < VANITY_LEN + ECDSA_SEAL_LEN {
            return Err(ConsensusError::MalformedExtra("extra field shorter than vanity + ECDSA seal"));
        }
        let mut vanity = [0u8; VANITY_LEN];
        vanity.copy_from_slice(&bytes[..VANITY_LEN]);

        let mut cursor = VANITY_LEN;
        let signers = match signer_count {
            Some(n) => {
                let signers_len = n * ADDRESS_LEN;
                if bytes.len() < cursor + signers_len + ECDSA_SEAL_LEN {
                    return Err(ConsensusError::MalformedExtra("extra field too short for declared signer count"));
                }
                let signers = bytes[cursor..cursor + signers_len]
                    .chunks_exact(ADDRESS_LEN)
                    .map(Address::from_slice)
                    .collect();
                cursor += signers_len;
                Some(signers)
            }
            None => None,
        };

        let ecdsa_start = bytes.len() - ECDSA_SEAL_LEN;
        let middle = &bytes[cursor..ecdsa_start];
        let pq_seal = if middle.is_empty() {
            None
        } else {
            Some(PqSeal::decode(middle)?)
        };

        let mut ecdsa_seal = [0u8; ECDSA_SEAL_LEN];
        ecdsa_seal.copy_from_slice(&bytes[ecdsa_start..]);

        Ok(HeaderExtra {
            vanity,
            signers,
            pq_seal,
            ecdsa_seal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_seal() -> PqSeal {
        PqSeal {
            algorithm: MlDsaAlgorithm::MlDsa65,
            signature: vec![0xAB; 3309],
            public_key: vec![0xCD; 1952],
        }
    }

    #[test]
    fn pq_seal_round_trips_through_encode_decode() {
        let seal = sample_seal();
        let encoded = seal.encode();
        let decoded = PqSeal::decode(&encoded).unwrap();
        assert_eq!(decoded, seal);
    }

    #[test]
    fn pq_seal_decode_rejects_length_mismatch() {
        let mut encoded = sample_seal().encode();
        encoded.truncate(encoded.len() - 1);
        assert!(PqSeal::decode(&encoded).is_err());
    }

    #[test]
    fn header_extra_round_trips_without_checkpoint_or_pq_seal() {
        let extra = HeaderExtra {
            vanity: [0x11; VANITY_LEN],
            signers: None,
            pq_seal: None,
            ecdsa_seal: [0x22; ECDSA_SEAL_LEN],
        };
        let encoded = extra.encode().unwrap();
        assert_eq!(encoded.len(), VANITY_LEN + ECDSA_SEAL_LEN);
        let decoded = HeaderExtra::decode(&encoded, None).unwrap();
        assert_eq!(decoded, extra);
    }

    #[test]
    fn header_extra_round_trips_with_checkpoint_signers_and_pq_seal() {
        let signers = vec![Address::repeat_byte(0x01), Address::repeat_byte(0x02)];
        let extra = HeaderExtra {
            vanity: [0x11; VANITY_LEN],
            signers: Some(signers.clone()),
            pq_seal: Some(sample_seal()),
            ecdsa_seal: [0x22; ECDSA_SEAL_LEN],
        };
        let encoded = extra.encode().unwrap();
        let decoded = HeaderExtra::decode(&encoded, Some(signers.len())).unwrap();
        assert_eq!(decoded, extra);
        // The ECDSA seal must remain the final 65 bytes (spec §6.1).
        assert_eq!(&encoded[encoded.len() - ECDSA_SEAL_LEN..], &extra.ecdsa_seal);
    }

    #[test]
    fn encode_rejects_extra_field_over_the_maximum() {
        let extra = HeaderExtra {
            vanity: [0u8; VANITY_LEN],
            signers: Some(vec![Address::ZERO; 10_000]),
            pq_seal: Some(sample_seal()),
            ecdsa_seal: [0u8; ECDSA_SEAL_LEN],
        };
        assert!(matches!(extra.encode(), Err(ConsensusError::ExtraTooLarge)));
    }
}
