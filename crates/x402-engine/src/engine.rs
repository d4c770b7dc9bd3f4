//! Payment verification and settlement (C5).

use std::sync::Arc;

use alloy_primitives::{Address, B256};
use tracing::instrument;

use splendor_core::network::Network;
use splendor_x402_types::{
    ErrorReason, PaymentPayload, PaymentRequirements, SettleResponse, VerifyResponse,
    message::recover_signer,
};

use crate::anti_replay::AntiReplayRegistry;
use crate::chain_state::ChainState;
use crate::error::PaymentError;
use crate::revenue::RevenueLedger;

/// Verifies and settles x402 payments against a [`ChainState`] view, recording anti-replay
/// entries and off-state revenue stats as a side effect of settlement.
///
/// Generic over `S: ChainState` so tests can swap in
/// [`crate::chain_state::in_memory::InMemoryChainState`] without touching production code.
pub struct PaymentEngine<S: ChainState> {
    network: Network,
    chain_state: Arc<S>,
    anti_replay: AntiReplayRegistry,
    revenue: RevenueLedger,
}

impl<S: ChainState> PaymentEngine<S> {
    pub fn new(network: Network, chain_state: Arc<S>) -> Self {
        PaymentEngine {
            network,
            chain_state,
            anti_replay: AntiReplayRegistry::new(),
            revenue: RevenueLedger::new(),
        }
    }

    pub fn revenue(&self) -> &RevenueLedger {
        &self.revenue
    }

    /// Runs the seven ordered checks from §4.5 without touching chain state. Returns the
    /// recovered payer address on success, for convenience (`verify`/`settle` both need it).
    #[instrument(skip_all)]
    async fn assert_valid(
        &self,
        requirements: &PaymentRequirements,
        payload: &PaymentPayload,
    ) -> Result<Address, PaymentError> {
        if payload.scheme != requirements.scheme {
            return Err(ErrorReason::UnsupportedScheme.into());
        }
        if payload.network != requirements.network || payload.network != self.network {
            return Err(ErrorReason::UnsupportedNetwork.into());
        }

        let now = self.chain_state.now().await.map_err(PaymentError::ChainState)?;
        let inner = &payload.payload;
        if now < inner.valid_after.seconds_since_epoch() {
            return Err(ErrorReason::NotYetValid.into());
        }
        if now > inner.valid_before.seconds_since_epoch() {
            return Err(ErrorReason::Expired.into());
        }

        let from = recover_signer(inner, self.network.chain_id())
            .map_err(|e| PaymentError::InvalidSignature(e.to_string()))?;
        if from != inner.from {
            return Err(PaymentError::InvalidSignature(format!(
                "recovered {from} does not match claimed sender {}",
                inner.from
            )));
        }

        let balance = self
            .chain_state
            .balance_of(inner.from)
            .await
            .map_err(PaymentError::ChainState)?;
        if balance < inner.value {
            return Err(ErrorReason::InsufficientBalance.into());
        }

        if inner.value != requirements.max_amount_required {
            return Err(ErrorReason::AmountMismatch.into());
        }
        if inner.to != requirements.pay_to {
            return Err(ErrorReason::RecipientMismatch.into());
        }
        if self.anti_replay.contains(inner.from, &inner.nonce) {
            return Err(ErrorReason::NonceReused.into());
        }

        Ok(from)
    }

    /// `x402_verify`: does not mutate state.
    #[instrument(skip_all)]
    pub async fn verify(
        &self,
        requirements: &PaymentRequirements,
        payload: &PaymentPayload,
    ) -> VerifyResponse {
        match self.assert_valid(requirements, payload).await {
            Ok(payer) => VerifyResponse::valid(payer),
            Err(err) => VerifyResponse::invalid(
                err.reason().unwrap_or(ErrorReason::InvalidSignature),
                None,
            ),
        }
    }

    /// `x402_settle`: re-verifies, then atomically records the nonce and moves balances.
    ///
    /// `tx_hash` is the hash of the typed transaction (C7) this settlement executes under;
    /// it is stamped into the response so `get_transaction_receipt` lookups line up, but this
    /// crate does not construct or hash transactions itself.
    #[instrument(skip_all)]
    pub async fn settle(
        &self,
        requirements: &PaymentRequirements,
        payload: &PaymentPayload,
        tx_hash: B256,
        block_validator: Address,
    ) -> SettleResponse {
        let payer = match self.assert_valid(requirements, payload).await {
            Ok(payer) => payer,
            Err(err) => {
                return SettleResponse::failure(
                    err.reason().unwrap_or(ErrorReason::InvalidSignature),
                    self.network,
                );
            }
        };

        let inner = &payload.payload;
        if !self.anti_replay.record(inner.from, &inner.nonce) {
            return SettleResponse::failure(ErrorReason::NonceReused, self.network);
        }

        if let Err(e) = self.chain_state.debit(inner.from, inner.value).await {
            tracing::error!(error = %e, "debit failed after anti-replay record");
            return SettleResponse::failure(ErrorReason::InsufficientBalance, self.network);
        }
        if let Err(e) = self.chain_state.credit(inner.to, inner.value).await {
            tracing::error!(error = %e, "credit failed after debit");
            return SettleResponse::failure(ErrorReason::InsufficientBalance, self.network);
        }

        self.revenue.record_settlement(block_validator, inner.value);
        SettleResponse::success(payer, tx_hash, self.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_state::in_memory::InMemoryChainState;
    use alloy_primitives::U256;
    use k256::ecdsa::signature::hazmat::PrehashSigner;
    use k256::ecdsa::{Signature as K256Signature, SigningKey};
    use splendor_x402_types::payload::{EvmSignature, ExactPayload, HexEncodedNonce};
    use splendor_x402_types::requirements::{ExactScheme, PaymentRequirements};
    use splendor_core::timestamp::UnixTimestamp;
    use url::Url;

    fn address_from_signing_key(signing_key: &SigningKey) -> Address {
        let uncompressed = signing_key.verifying_key().to_encoded_point(false);
        let hash = alloy_primitives::keccak256(&uncompressed.as_bytes()[1..]);
        Address::from_slice(&hash[12..])
    }

    fn signed_payload(
        key: &[u8; 32],
        to: Address,
        value: U256,
        nonce: [u8; 32],
        chain_id: u64,
    ) -> (PaymentPayload, Address) {
        let signing_key = SigningKey::from_bytes(key.into()).expect("valid key");
        let from = address_from_signing_key(&signing_key);

        let mut inner = ExactPayload {
            from,
            to,
            value,
            valid_after: UnixTimestamp(0),
            valid_before: UnixTimestamp(9_999_999_999),
            nonce: HexEncodedNonce(nonce),
            signature: EvmSignature([0u8; 65]),
        };
        let message = splendor_x402_types::message::canonical_message_v2(&inner, chain_id);
        let prefixed = format!("\x19Ethereum Signed Message:\n{}{}", message.len(), message);
        let hash = alloy_primitives::keccak256(prefixed.as_bytes());
        let (sig, recid): (K256Signature, _) =
            signing_key.sign_prehash(hash.as_slice()).expect("sign");
        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&sig.to_bytes());
        bytes[64] = recid.to_byte() + 27;
        inner.signature = EvmSignature(bytes);

        let payload = PaymentPayload {
            x402_version: 1,
            scheme: ExactScheme,
            network: Network::Splendor,
            payload: inner,
        };
        (payload, from)
    }

    fn requirements(pay_to: Address, amount: U256) -> PaymentRequirements {
        PaymentRequirements {
            scheme: ExactScheme,
            network: Network::Splendor,
            max_amount_required: amount,
            resource: Url::parse("https://api.example.com/report").unwrap(),
            description: "report".into(),
            mime_type: "application/json".into(),
            pay_to,
            max_timeout_seconds: 300,
            asset: Address::ZERO,
        }
    }

    #[tokio::test]
    async fn verify_accepts_well_formed_payment() {
        let to = Address::repeat_byte(0x22);
        let value = U256::from(1_000u64);
        let (payload, from) = signed_payload(&[0x11; 32], to, value, [0x01; 32], 6402);
        let reqs = requirements(to, value);

        let chain_state = Arc::new(InMemoryChainState::new().with_balance(from, U256::from(10_000u64)));
        let engine = PaymentEngine::new(Network::Splendor, chain_state);

        let resp = engine.verify(&reqs, &payload).await;
        assert!(resp.is_valid);
        assert_eq!(resp.payer, Some(from));
    }

    #[tokio::test]
    async fn verify_rejects_insufficient_balance() {
        let to = Address::repeat_byte(0x22);
        let value = U256::from(1_000u64);
        let (payload, from) = signed_payload(&[0x11; 32], to, value, [0x01; 32], 6402);
        let reqs = requirements(to, value);

        let chain_state = Arc::new(InMemoryChainState::new().with_balance(from, U256::from(1u64)));
        let engine = PaymentEngine::new(Network::Splendor, chain_state);

        let resp = engine.verify(&reqs, &payload).await;
        assert!(!resp.is_valid);
        assert_eq!(resp.invalid_reason, Some(ErrorReason::InsufficientBalance));
    }

    #[tokio::test]
    async fn settle_moves_balances_and_rejects_replay() {
        let to = Address::repeat_byte(0x22);
        let value = U256::from(1_000u64);
        let (payload, from) = signed_payload(&[0x11; 32], to, value, [0x01; 32], 6402);
        let reqs = requirements(to, value);

        let chain_state = Arc::new(InMemoryChainState::new().with_balance(from, U256::from(10_000u64)));
        let engine = PaymentEngine::new(Network::Splendor, chain_state.clone());
        let validator = Address::repeat_byte(0x99);

        let first = engine
            .settle(&reqs, &payload, B256::repeat_byte(0xaa), validator)
            .await;
        assert!(first.success);
        assert_eq!(
            chain_state.balance_of(to).await.unwrap(),
            value
        );
        assert_eq!(
            chain_state.balance_of(from).await.unwrap(),
            U256::from(9_000u64)
        );

        let second = engine
            .settle(&reqs, &payload, B256::repeat_byte(0xbb), validator)
            .await;
        assert!(!second.success);
        assert_eq!(second.error_reason, Some(ErrorReason::NonceReused));

        assert_eq!(engine.revenue().validator_revenue(validator), value);
    }
}
