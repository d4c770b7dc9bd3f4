//! RLP-decode + hash + basic field extraction for transaction batches (spec §4.2
//! `submit_transactions`).
//!
//! This is deliberately narrow: the generic EVM interpreter and its full transaction-type
//! registry are named out-of-scope collaborators. What's decoded here is the handful of
//! fields the hybrid pipeline needs before handing a transaction to that interpreter: its
//! hash, nonce, gas limit and chain id, plus whether it decoded at all.

use alloy_primitives::{Address, Bytes, U256, keccak256};
use alloy_rlp::{Decodable, Header};

use crate::packing::{TX_SLOT_WIDTH, pack_slot};

/// Result of decoding one transaction (spec §4.2 `TxResult`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResult {
    pub hash: [u8; 32],
    pub valid: bool,
    pub gas_used: u64,
    pub chain_id: u64,
    pub nonce: u64,
    pub tx_type: u8,
    pub error: Option<&'static str>,
}

/// Decodes each (possibly slot-truncated) input, returning one [`TxResult`] per item plus
/// the number of inputs that were truncated to fit the transaction slot width.
pub fn compute(inputs: &[Vec<u8>]) -> (Vec<TxResult>, usize) {
    let mut truncated_count = 0;
    let results = inputs
        .iter()
        .map(|input| {
            let (slot, truncated) = pack_slot::<TX_SLOT_WIDTH>(input);
            if truncated {
                truncated_count += 1;
            }
            let len = slot.length as usize;
            decode_one(&slot.bytes[..len])
        })
        .collect();
    (results, truncated_count)
}

fn decode_one(bytes: &[u8]) -> TxResult {
    let hash = *keccak256(bytes);
    if bytes.is_empty() {
        return TxResult {
            hash,
            valid: false,
            gas_used: 0,
            chain_id: 0,
            nonce: 0,
            tx_type: 0,
            error: Some("empty transaction"),
        };
    }

    // A legacy transaction's RLP encoding starts with a list header (>= 0xc0); anything else
    // is a typed envelope whose first byte is the type tag (spec §6.2).
    let tx_type = if bytes[0] < 0xc0 { bytes[0] } else { 0 };
    let body = if tx_type == 0 { bytes } else { &bytes[1..] };

    match decode_legacy_shaped_fields(body) {
        Ok(fields) => TxResult {
            hash,
            valid: true,
            gas_used: fields.gas_limit,
            chain_id: fields.chain_id,
            nonce: fields.nonce,
            tx_type,
            error: None,
        },
        Err(_) => TxResult {
            hash,
            valid: false,
            gas_used: 0,
            chain_id: 0,
            nonce: 0,
            tx_type,
            error: Some("rlp decode failed"),
        },
    }
}

struct LegacyFields {
    nonce: u64,
    gas_limit: u64,
    chain_id: u64,
}

/// Decodes the `[nonce, gasPrice, gasLimit, to, value, data, v, r, s]` legacy transaction
/// shape, deriving `chain_id` from `v` per EIP-155 when present.
fn decode_legacy_shaped_fields(body: &[u8]) -> Result<LegacyFields, alloy_rlp::Error> {
    let mut buf = body;
    let header = Header::decode(&mut buf)?;
    if !header.list {
        return Err(alloy_rlp::Error::UnexpectedString);
    }

    let nonce = u64::decode(&mut buf)?;
    let _gas_price = U256::decode(&mut buf)?;
    let gas_limit = u64::decode(&mut buf)?;
    let _to: Bytes = Bytes::decode(&mut buf)?; // empty for contract-creation transactions
    let _value = U256::decode(&mut buf)?;
    let _data: Bytes = Bytes::decode(&mut buf)?;
    let v = u64::decode(&mut buf)?;
    let _r = U256::decode(&mut buf)?;
    let _s = U256::decode(&mut buf)?;

    let chain_id = if v >= 35 { (v - 35) / 2 } else { 0 };
    Ok(LegacyFields {
        nonce,
        gas_limit,
        chain_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::Encodable;

    fn encode_legacy(nonce: u64, gas_limit: u64, v: u64) -> Vec<u8> {
        let mut fields: Vec<u8> = Vec::new();
        nonce.encode(&mut fields);
        U256::from(1_000_000_000u64).encode(&mut fields); // gasPrice
        gas_limit.encode(&mut fields);
        Bytes::from(Address::repeat_byte(0x11).to_vec()).encode(&mut fields); // to
        U256::ZERO.encode(&mut fields); // value
        Bytes::new().encode(&mut fields); // data
        v.encode(&mut fields);
        U256::from(1u64).encode(&mut fields); // r
        U256::from(1u64).encode(&mut fields); // s

        let mut out = Vec::new();
        alloy_rlp::Header {
            list: true,
            payload_length: fields.len(),
        }
        .encode(&mut out);
        out.extend_from_slice(&fields);
        out
    }

    #[test]
    fn decodes_nonce_gas_and_chain_id_from_legacy_transaction() {
        // EIP-155 chain id 1337: v = chain_id*2 + 35 = 2709.
        let raw = encode_legacy(42, 21_000, 2709);
        let (results, truncated) = compute(&[raw]);
        assert_eq!(truncated, 0);
        let result = &results[0];
        assert!(result.valid);
        assert_eq!(result.nonce, 42);
        assert_eq!(result.gas_used, 21_000);
        assert_eq!(result.chain_id, 1337);
    }

    #[test]
    fn empty_input_is_invalid_not_a_panic() {
        let (results, _) = compute(&[Vec::new()]);
        assert!(!results[0].valid);
        assert!(results[0].error.is_some());
    }

    #[test]
    fn garbage_bytes_decode_invalid_rather_than_abort() {
        let (results, _) = compute(&[vec![0xFF, 0x01, 0x02]]);
        assert!(!results[0].valid);
    }

    #[test]
    fn oversized_transaction_is_truncated_before_decode() {
        let mut raw = encode_legacy(1, 21_000, 27);
        raw.extend(std::iter::repeat(0u8).take(TX_SLOT_WIDTH));
        let (_, truncated) = compute(&[raw]);
        assert_eq!(truncated, 1);
    }
}
