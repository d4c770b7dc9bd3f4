//! Off-state revenue bookkeeping for settled x402 payments.
//!
//! This is analytics only: recording a settlement here never touches a balance. The split
//! and distribution mode are process-local and reset on restart, per the Open Question
//! resolution in the grounding ledger.

use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use std::sync::RwLock;

/// How settled volume is distributed across validators for dashboard purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionMode {
    ProportionalToSettledVolume,
    EqualPerValidator,
    PerformanceWeighted,
}

/// The three-way split applied to every settled payment's recorded revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueSplit {
    pub developer_bps: u16,
    pub validator_pool_bps: u16,
    pub protocol_treasury_bps: u16,
}

impl Default for RevenueSplit {
    fn default() -> Self {
        RevenueSplit {
            developer_bps: 9_000,
            validator_pool_bps: 500,
            protocol_treasury_bps: 500,
        }
    }
}

impl RevenueSplit {
    pub fn is_valid(&self) -> bool {
        self.developer_bps as u32 + self.validator_pool_bps as u32 + self.protocol_treasury_bps as u32
            == 10_000
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RevenueStats {
    pub total_settled_volume: U256,
    pub developer_share: U256,
    pub validator_pool_share: U256,
    pub protocol_treasury_share: U256,
}

/// Tracks settled volume per validator and the configured split/distribution mode.
///
/// The validator attributed to a settlement is whichever validator produced the block it
/// landed in; that attribution is supplied by the caller (the block-execution path, outside
/// this crate's scope), not derived here.
#[derive(Debug)]
pub struct RevenueLedger {
    per_validator: DashMap<Address, U256>,
    split: RwLock<RevenueSplit>,
    mode: RwLock<DistributionMode>,
}

impl Default for RevenueLedger {
    fn default() -> Self {
        RevenueLedger {
            per_validator: DashMap::new(),
            split: RwLock::new(RevenueSplit::default()),
            mode: RwLock::new(DistributionMode::ProportionalToSettledVolume),
        }
    }
}

impl RevenueLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` of settled volume as attributable to `validator`.
    pub fn record_settlement(&self, validator: Address, value: U256) {
        *self.per_validator.entry(validator).or_insert(U256::ZERO) += value;
    }

    pub fn validator_revenue(&self, validator: Address) -> U256 {
        self.per_validator
            .get(&validator)
            .map(|v| *v)
            .unwrap_or_default()
    }

    pub fn top_validators(&self, limit: usize) -> Vec<(Address, U256)> {
        let mut entries: Vec<_> = self
            .per_validator
            .iter()
            .map(|e| (*e.key(), *e.value()))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(limit);
        entries
    }

    pub fn stats(&self) -> RevenueStats {
        let split = *self.split.read().expect("split lock poisoned");
        let total: U256 = self.per_validator.iter().map(|e| *e.value()).sum();
        RevenueStats {
            total_settled_volume: total,
            developer_share: total * U256::from(split.developer_bps) / U256::from(10_000u32),
            validator_pool_share: total * U256::from(split.validator_pool_bps) / U256::from(10_000u32),
            protocol_treasury_share: total * U256::from(split.protocol_treasury_bps)
                / U256::from(10_000u32),
        }
    }

    pub fn set_split(&self, split: RevenueSplit) -> Result<(), &'static str> {
        if !split.is_valid() {
            return Err("revenue split must sum to 10000 bps");
        }
        *self.split.write().expect("split lock poisoned") = split;
        Ok(())
    }

    pub fn set_distribution_mode(&self, mode: DistributionMode) {
        *self.mode.write().expect("mode lock poisoned") = mode;
    }

    pub fn distribution_mode(&self) -> DistributionMode {
        *self.mode.read().expect("mode lock poisoned")
    }
}
