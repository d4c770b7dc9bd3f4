//! The state view this engine settles against.
//!
//! The real chain-data database and block executor are out of scope (named but not
//! specified collaborators). [`ChainState`] is the seam between them and this crate: it
//! exposes exactly the reads and writes §4.5 needs — balance lookup, debit/credit, and the
//! current block's timestamp — without committing to how balances or blocks are actually
//! stored.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

/// A view onto account balances and the current block, as the executor would provide it
/// during transaction execution.
#[async_trait]
pub trait ChainState: Send + Sync {
    async fn balance_of(&self, address: Address) -> Result<U256, String>;

    /// Debits `from` by `value`. Callers must have already checked `balance_of(from) >= value`;
    /// implementations may still return an error (e.g. on a concurrent-write conflict).
    async fn debit(&self, from: Address, value: U256) -> Result<(), String>;

    /// Credits `to` by `value`.
    async fn credit(&self, to: Address, value: U256) -> Result<(), String>;

    /// Unix timestamp of the block this settlement executes under.
    async fn now(&self) -> Result<u64, String>;
}

/// An in-memory [`ChainState`] for tests and standalone operation: a `dashmap` of balances,
/// with `now()` reading the wall clock.
pub mod in_memory {
    use super::*;
    use dashmap::DashMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[derive(Debug, Default)]
    pub struct InMemoryChainState {
        balances: DashMap<Address, U256>,
    }

    impl InMemoryChainState {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_balance(self, address: Address, balance: U256) -> Self {
            self.balances.insert(address, balance);
            self
        }

        pub fn set_balance(&self, address: Address, balance: U256) {
            self.balances.insert(address, balance);
        }
    }

    #[async_trait]
    impl ChainState for InMemoryChainState {
        async fn balance_of(&self, address: Address) -> Result<U256, String> {
            Ok(self.balances.get(&address).map(|v| *v).unwrap_or_default())
        }

        async fn debit(&self, from: Address, value: U256) -> Result<(), String> {
            let mut entry = self.balances.entry(from).or_insert(U256::ZERO);
            let balance = *entry;
            if balance < value {
                return Err(format!(
                    "insufficient balance: have {balance}, need {value}"
                ));
            }
            *entry = balance - value;
            Ok(())
        }

        async fn credit(&self, to: Address, value: U256) -> Result<(), String> {
            let mut entry = self.balances.entry(to).or_insert(U256::ZERO);
            *entry += value;
            Ok(())
        }

        async fn now(&self) -> Result<u64, String> {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .map_err(|e| e.to_string())
        }
    }
}
