//! The x402 typed transaction body: an RLP envelope carrying a [`PaymentPayload`] as its
//! entire payload, per spec §4.7.

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};

use splendor_core::network::Network;
use splendor_x402_types::payload::{EvmSignature, ExactPayload, HexEncodedNonce};
use splendor_x402_types::requirements::ExactScheme;
use splendor_x402_types::PaymentPayload;

use crate::constants::X402_TX_TYPE;
use crate::error::TxError;

/// The RLP body of an x402 typed transaction. Carries exactly the fields of an
/// [`ExactPayload`] — no gas price, gas limit, or nonce-as-sequence-number, since these
/// transactions consume no gas and are ordered by their own `(from, nonce)` pair rather
/// than an account sequence counter (spec §4.7).
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct X402TxBody {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub valid_after: u64,
    pub valid_before: u64,
    pub nonce: B256,
    pub signature: Bytes,
}

impl X402TxBody {
    fn from_payload(payload: &ExactPayload) -> Self {
        X402TxBody {
            from: payload.from,
            to: payload.to,
            value: payload.value,
            valid_after: payload.valid_after.seconds_since_epoch(),
            valid_before: payload.valid_before.seconds_since_epoch(),
            nonce: B256::from(payload.nonce.0),
            signature: Bytes::copy_from_slice(&payload.signature.0),
        }
    }

    fn into_exact_payload(self) -> Result<ExactPayload, TxError> {
        let signature: [u8; 65] = self
            .signature
            .as_ref()
            .try_into()
            .map_err(|_| TxError::MalformedBody("signature must be 65 bytes".into()))?;

        Ok(ExactPayload {
            from: self.from,
            to: self.to,
            value: self.value,
            valid_after: splendor_core::timestamp::UnixTimestamp(self.valid_after),
            valid_before: splendor_core::timestamp::UnixTimestamp(self.valid_before),
            nonce: HexEncodedNonce(self.nonce.0),
            signature: EvmSignature(signature),
        })
    }
}

/// A fully-formed x402 typed transaction: the [`X402_TX_TYPE`] type byte followed by the
/// RLP-encoded [`X402TxBody`], per the EIP-2718 typed-transaction envelope convention named
/// in spec §6.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X402Transaction {
    pub body: X402TxBody,
}

impl X402Transaction {
    /// Builds a typed transaction from a wire [`PaymentPayload`]. The payload's
    /// `x402_version`/`scheme`/`network` fields are not part of the typed-tx body — they are
    /// re-derived on the way back out in [`Self::to_payment_payload`], since every payload on
    /// this chain carries the same fixed `(1, "exact", splendor)` triple (spec §6.1).
    pub fn from_payment_payload(payload: &PaymentPayload) -> Self {
        X402Transaction {
            body: X402TxBody::from_payload(&payload.payload),
        }
    }

    /// Reconstructs the wire [`PaymentPayload`] this transaction carries.
    pub fn to_payment_payload(&self) -> Result<PaymentPayload, TxError> {
        Ok(PaymentPayload {
            x402_version: 1,
            scheme: ExactScheme,
            network: Network::Splendor,
            payload: self.body.clone().into_exact_payload()?,
        })
    }

    pub fn from(&self) -> Address {
        self.body.from
    }

    pub fn nonce(&self) -> B256 {
        self.body.nonce
    }

    /// `type_byte || rlp(body)`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.body.length());
        out.push(X402_TX_TYPE);
        self.body.encode(&mut out);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, TxError> {
        let (type_byte, rest) = bytes
            .split_first()
            .ok_or_else(|| TxError::MalformedBody("empty transaction bytes".into()))?;
        if *type_byte != X402_TX_TYPE {
            return Err(TxError::WrongTxType {
                expected: X402_TX_TYPE,
                found: *type_byte,
            });
        }
        let mut slice = rest;
        let body = X402TxBody::decode(&mut slice)
            .map_err(|e| TxError::MalformedBody(e.to_string()))?;
        if !slice.is_empty() {
            return Err(TxError::MalformedBody("trailing bytes after RLP body".into()));
        }
        Ok(X402Transaction { body })
    }

    /// `keccak256` of the encoded transaction, used as the `tx_hash` stamped into
    /// settlement responses and receipts.
    pub fn hash(&self) -> B256 {
        alloy_primitives::keccak256(self.encode())
    }
}
