//! The x402 typed-transaction mempool (C7): a narrow stand-in for the out-of-scope full
//! transaction pool, just wide enough to enforce spec §4.7's two invariants — "only
//! transactions that pass C5 verification are accepted" and "no two pending transactions
//! share a `(from, nonce)` pair".

use std::sync::Arc;

use alloy_primitives::{Address, B256};
use dashmap::{DashMap, DashSet};

use splendor_x402_engine::ChainState;
use splendor_x402_engine::PaymentEngine;
use splendor_x402_types::PaymentRequirements;
use splendor_x402_types::requirements::ExactScheme;

use crate::error::MempoolError;
use crate::transaction::X402Transaction;

/// Narrow collaborator seam for the out-of-scope full transaction pool. Mirrors
/// [`splendor_x402_engine::ChainState`]'s role: specified here only to the depth §4.7
/// actually needs.
pub trait Mempool: Send + Sync {
    /// Validates and admits `tx`. Rejects a `(from, nonce)` pair already pending.
    fn submit(&self, tx: X402Transaction) -> Result<(), MempoolError>;

    fn contains_nonce_pair(&self, from: Address, nonce: B256) -> bool;

    /// Removes and returns every pending transaction, for block assembly. The caller is
    /// responsible for re-checking `(from, nonce)` uniqueness against the block it is
    /// building alongside other transaction sources — this only drains what this mempool
    /// itself was tracking.
    fn drain_for_block(&self) -> Vec<X402Transaction>;
}

/// Synthesizes trivially-matching [`PaymentRequirements`] from a transaction's own payload
/// fields, so the mempool can re-run the same C5 verification path `x402_verify` uses
/// without needing the original HTTP `402` requirements the payload was signed against —
/// the typed transaction only carries the payload, not the requirements (spec §4.7).
///
/// The price/recipient/scheme/network fields are set to mirror the payload exactly, so
/// those checks trivially pass; the checks that matter here — signature, time window,
/// balance, replay — are unaffected by this substitution.
fn requirements_from_tx(tx: &X402Transaction) -> Result<PaymentRequirements, MempoolError> {
    let payload = tx.to_payment_payload()?;
    Ok(PaymentRequirements {
        scheme: ExactScheme,
        network: payload.network,
        max_amount_required: payload.payload.value,
        resource: url::Url::parse("splendor://mempool/x402").expect("valid url"),
        description: "x402 typed transaction".into(),
        mime_type: "application/octet-stream".into(),
        pay_to: payload.payload.to,
        max_timeout_seconds: u64::MAX,
        asset: Address::ZERO,
    })
}

/// An in-memory [`Mempool`] backed by a `dashmap` pending set, used standalone and in tests.
///
/// Re-verifies every submitted transaction against a [`PaymentEngine`] before admission
/// (spec §4.7: "run C5's verification; accept only if `is_valid`"), and tracks pending
/// `(from, nonce)` pairs in a set distinct from the engine's own chain-wide anti-replay
/// registry — a nonce can be "not yet settled" (pending here) while not yet being "consumed"
/// on chain.
pub struct InMemoryMempool<S: ChainState> {
    engine: Arc<PaymentEngine<S>>,
    pending: DashMap<B256, X402Transaction>,
    pending_nonces: DashSet<(Address, B256)>,
}

impl<S: ChainState> InMemoryMempool<S> {
    pub fn new(engine: Arc<PaymentEngine<S>>) -> Self {
        InMemoryMempool {
            engine,
            pending: DashMap::new(),
            pending_nonces: DashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Blocking re-verification entry point used by [`Mempool::submit`]; split out so async
    /// callers can drive the same check directly against the `tokio` runtime they already
    /// hold, rather than going through a blocking trait method.
    pub async fn submit_async(&self, tx: X402Transaction) -> Result<(), MempoolError> {
        let from = tx.from();
        let nonce = tx.nonce();
        if self.pending_nonces.contains(&(from, nonce)) {
            return Err(MempoolError::DuplicatePending { from, nonce });
        }

        let requirements = requirements_from_tx(&tx)?;
        let payload = tx.to_payment_payload()?;
        let verdict = self.engine.verify(&requirements, &payload).await;
        if !verdict.is_valid {
            return Err(MempoolError::FailedVerification {
                reason: verdict.invalid_reason.unwrap_or(
                    splendor_x402_types::ErrorReason::InvalidSignature,
                ),
            });
        }

        self.pending_nonces.insert((from, nonce));
        self.pending.insert(tx.hash(), tx);
        Ok(())
    }
}

impl<S: ChainState> Mempool for InMemoryMempool<S> {
    fn submit(&self, tx: X402Transaction) -> Result<(), MempoolError> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(self.submit_async(tx))
        })
    }

    fn contains_nonce_pair(&self, from: Address, nonce: B256) -> bool {
        self.pending_nonces.contains(&(from, nonce))
    }

    fn drain_for_block(&self) -> Vec<X402Transaction> {
        let txs: Vec<X402Transaction> = self
            .pending
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        self.pending.clear();
        self.pending_nonces.clear();
        txs
    }
}
