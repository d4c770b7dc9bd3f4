//! Integration tests for payment settlement (C5).

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256, keccak256};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature as K256Signature, SigningKey};
use url::Url;

use splendor_core::network::Network;
use splendor_core::timestamp::UnixTimestamp;
use splendor_x402_engine::chain_state::in_memory::InMemoryChainState;
use splendor_x402_engine::engine::PaymentEngine;
use splendor_x402_types::payload::{EvmSignature, ExactPayload, HexEncodedNonce};
use splendor_x402_types::requirements::{ExactScheme, PaymentRequirements};
use splendor_x402_types::response::ErrorReason;
use splendor_x402_types::{PaymentPayload, message::canonical_message_v2};

fn address_from_signing_key(signing_key: &SigningKey) -> Address {
    let uncompressed = signing_key.verifying_key().to_encoded_point(false);
    let hash = keccak256(&uncompressed.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

fn signed_payload(
    key_byte: u8,
    to: Address,
    value: U256,
    nonce: [u8; 32],
    valid_after: u64,
    valid_before: u64,
    chain_id: u64,
) -> (PaymentPayload, Address) {
    let signing_key = SigningKey::from_bytes(&[key_byte; 32].into()).expect("valid key");
    let from = address_from_signing_key(&signing_key);

    let mut inner = ExactPayload {
        from,
        to,
        value,
        valid_after: UnixTimestamp(valid_after),
        valid_before: UnixTimestamp(valid_before),
        nonce: HexEncodedNonce(nonce),
        signature: EvmSignature([0u8; 65]),
    };
    let message = canonical_message_v2(&inner, chain_id);
    let prefixed = format!("\x19Ethereum Signed Message:\n{}{}", message.len(), message);
    let hash = keccak256(prefixed.as_bytes());
    let (sig, recid): (K256Signature, _) = signing_key.sign_prehash(hash.as_slice()).expect("sign");
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

/// S1: a nonce can settle exactly once; a second settlement of the same `(from, nonce)` is
/// rejected even though the signature and amount are otherwise perfectly valid.
#[tokio::test]
async fn replay_of_same_nonce_is_rejected() {
    let to = Address::repeat_byte(0x22);
    let value = U256::from(1_000u64);
    let (payload, from) = signed_payload(0x11, to, value, [0x01; 32], 0, 9_999_999_999, 6402);
    let reqs = requirements(to, value);

    let chain_state = Arc::new(InMemoryChainState::new().with_balance(from, U256::from(100_000u64)));
    let engine = PaymentEngine::new(Network::Splendor, chain_state);
    let validator = Address::repeat_byte(0x99);

    let first = engine
        .settle(&reqs, &payload, B256::repeat_byte(0x01), validator)
        .await;
    assert!(first.success);

    let replay = engine
        .settle(&reqs, &payload, B256::repeat_byte(0x02), validator)
        .await;
    assert!(!replay.success);
    assert_eq!(replay.error_reason, Some(ErrorReason::NonceReused));
}

/// S2: a successful settlement moves exactly `value` from payer to payee; no more, no less.
#[tokio::test]
async fn settlement_preserves_balance_deltas() {
    let to = Address::repeat_byte(0x33);
    let value = U256::from(2_500u64);
    let (payload, from) = signed_payload(0x22, to, value, [0x02; 32], 0, 9_999_999_999, 6402);
    let reqs = requirements(to, value);

    let starting_from = U256::from(50_000u64);
    let starting_to = U256::from(10u64);
    let chain_state = Arc::new(
        InMemoryChainState::new()
            .with_balance(from, starting_from)
            .with_balance(to, starting_to),
    );
    let engine = PaymentEngine::new(Network::Splendor, chain_state.clone());

    let result = engine
        .settle(&reqs, &payload, B256::repeat_byte(0x03), Address::repeat_byte(0x99))
        .await;
    assert!(result.success);

    let from_after = chain_state.balance_of(from).await.unwrap();
    let to_after = chain_state.balance_of(to).await.unwrap();
    assert_eq!(starting_from - from_after, value);
    assert_eq!(to_after - starting_to, value);
}

/// S3: if the re-verification inside `settle` fails, neither the nonce nor any balance is
/// touched — a rejected settlement must be a complete no-op.
#[tokio::test]
async fn failed_reverify_leaves_nonce_and_balances_untouched() {
    let claimed_recipient = Address::repeat_byte(0x44);
    let actual_recipient = Address::repeat_byte(0x55);
    let value = U256::from(750u64);
    let (payload, from) = signed_payload(0x33, actual_recipient, value, [0x03; 32], 0, 9_999_999_999, 6402);
    // Requirements name a different payee than the one the payload was signed for.
    let reqs = requirements(claimed_recipient, value);

    let chain_state = Arc::new(InMemoryChainState::new().with_balance(from, U256::from(100_000u64)));
    let engine = PaymentEngine::new(Network::Splendor, chain_state.clone());

    let result = engine
        .settle(&reqs, &payload, B256::repeat_byte(0x04), Address::repeat_byte(0x99))
        .await;
    assert!(!result.success);
    assert_eq!(result.error_reason, Some(ErrorReason::RecipientMismatch));

    assert_eq!(chain_state.balance_of(from).await.unwrap(), U256::from(100_000u64));
    assert_eq!(chain_state.balance_of(actual_recipient).await.unwrap(), U256::ZERO);

    // The nonce was never recorded, so the same payload could still settle against
    // correctly-matching requirements.
    let fixed_reqs = requirements(actual_recipient, value);
    let retried = engine
        .settle(&fixed_reqs, &payload, B256::repeat_byte(0x05), Address::repeat_byte(0x99))
        .await;
    assert!(retried.success);
}

/// S4: an expired authorization is rejected on the time-window check, even when the account
/// also has insufficient balance — callers should see the more specific failure.
#[tokio::test]
async fn expiry_check_precedes_balance_check() {
    let to = Address::repeat_byte(0x66);
    let value = U256::from(1_000u64);
    let (payload, from) = signed_payload(0x44, to, value, [0x04; 32], 0, 1, 6402);
    let reqs = requirements(to, value);

    // Balance is also insufficient, but expiry must be reported first.
    let chain_state = Arc::new(InMemoryChainState::new().with_balance(from, U256::ZERO));
    let engine = PaymentEngine::new(Network::Splendor, chain_state);

    let resp = engine.verify(&reqs, &payload).await;
    assert!(!resp.is_valid);
    assert_eq!(resp.invalid_reason, Some(ErrorReason::Expired));
}
