//! The `x402_*` JSON-RPC namespace (spec §4.6).

use std::sync::Arc;

use alloy_primitives::Address;
use jsonrpsee::core::{RpcResult, async_trait};
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::types::ErrorObjectOwned;
use serde::{Deserialize, Serialize};

use splendor_core::network::Network;
use splendor_tx_x402::{InMemoryMempool, X402Transaction};
use splendor_x402_engine::{ChainState, PaymentEngine};
use splendor_x402_engine::revenue::{DistributionMode, RevenueSplit};
use splendor_x402_types::requirements::ExactScheme;
use splendor_x402_types::{PaymentPayload, PaymentRequirements, SettleResponse, VerifyResponse};

/// One entry of `x402_supported`'s response: a scheme/network pair this node accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedKind {
    pub scheme: ExactScheme,
    pub network: Network,
}

/// `U256`/split values don't roundtrip through JSON-RPC as native numbers without losing
/// precision, so revenue figures go over the wire as decimal strings — the same convention
/// `UnixTimestamp` already uses for payload timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStatsDto {
    pub total_settled_volume: String,
    pub developer_share: String,
    pub validator_pool_share: String,
    pub protocol_treasury_share: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorRevenueEntry {
    pub validator: Address,
    pub revenue: String,
}

#[rpc(server, namespace = "x402")]
pub trait X402Rpc {
    #[method(name = "supported")]
    async fn supported(&self) -> RpcResult<Vec<SupportedKind>>;

    #[method(name = "verify")]
    async fn verify(
        &self,
        requirements: PaymentRequirements,
        payload: PaymentPayload,
    ) -> RpcResult<VerifyResponse>;

    /// Constructs a typed transaction (C7) carrying `payload`, submits it to the mempool, and
    /// returns before the transaction is mined (spec §4.6): the response's `transaction` field
    /// is the typed transaction's hash, not a settlement confirmation.
    #[method(name = "settle")]
    async fn settle(
        &self,
        requirements: PaymentRequirements,
        payload: PaymentPayload,
    ) -> RpcResult<SettleResponse>;

    #[method(name = "getValidatorRevenue")]
    async fn get_validator_revenue(&self, address: Address) -> RpcResult<String>;

    #[method(name = "getRevenueStats")]
    async fn get_revenue_stats(&self) -> RpcResult<RevenueStatsDto>;

    #[method(name = "getTopPerformingValidators")]
    async fn get_top_performing_validators(&self, limit: usize) -> RpcResult<Vec<ValidatorRevenueEntry>>;

    /// `fraction` is the validator pool's share of settled volume, in `[0.0, 1.0]`. The
    /// remainder is re-split between the developer and protocol-treasury shares in their
    /// default 18:1 ratio, keeping [`RevenueSplit::is_valid`]'s "sums to 10000 bps" invariant.
    #[method(name = "setValidatorFeeShare")]
    async fn set_validator_fee_share(&self, fraction: f64) -> RpcResult<()>;

    #[method(name = "setDistributionMode")]
    async fn set_distribution_mode(&self, mode: String) -> RpcResult<()>;
}

fn internal_error(message: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(-32000, message.into(), None::<()>)
}

fn invalid_params(message: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(-32602, message.into(), None::<()>)
}

/// Backs the `x402` namespace with a [`PaymentEngine`] for `verify` and a
/// [`splendor_tx_x402::Mempool`] for `settle`.
pub struct X402RpcImpl<S: ChainState> {
    network: Network,
    engine: Arc<PaymentEngine<S>>,
    mempool: Arc<InMemoryMempool<S>>,
}

impl<S: ChainState> X402RpcImpl<S> {
    pub fn new(network: Network, engine: Arc<PaymentEngine<S>>, mempool: Arc<InMemoryMempool<S>>) -> Self {
        X402RpcImpl {
            network,
            engine,
            mempool,
        }
    }
}

#[async_trait]
impl<S: ChainState + 'static> X402RpcServer for X402RpcImpl<S> {
    async fn supported(&self) -> RpcResult<Vec<SupportedKind>> {
        Ok(vec![SupportedKind {
            scheme: ExactScheme,
            network: self.network,
        }])
    }

    async fn verify(
        &self,
        requirements: PaymentRequirements,
        payload: PaymentPayload,
    ) -> RpcResult<VerifyResponse> {
        Ok(self.engine.verify(&requirements, &payload).await)
    }

    async fn settle(
        &self,
        requirements: PaymentRequirements,
        payload: PaymentPayload,
    ) -> RpcResult<SettleResponse> {
        let verdict = self.engine.verify(&requirements, &payload).await;
        if !verdict.is_valid {
            return Ok(SettleResponse::failure(
                verdict
                    .invalid_reason
                    .unwrap_or(splendor_x402_types::ErrorReason::InvalidSignature),
                self.network,
            ));
        }

        let tx = X402Transaction::from_payment_payload(&payload);
        let payer = tx.from();
        let tx_hash = tx.hash();

        match self.mempool.submit_async(tx).await {
            Ok(()) => Ok(SettleResponse::success(payer, tx_hash, self.network)),
            Err(splendor_tx_x402::MempoolError::DuplicatePending { .. }) => Ok(SettleResponse::failure(
                splendor_x402_types::ErrorReason::NonceReused,
                self.network,
            )),
            Err(splendor_tx_x402::MempoolError::FailedVerification { reason }) => {
                Ok(SettleResponse::failure(reason, self.network))
            }
            Err(e) => Err(internal_error(e.to_string())),
        }
    }

    async fn get_validator_revenue(&self, address: Address) -> RpcResult<String> {
        Ok(self.engine.revenue().validator_revenue(address).to_string())
    }

    async fn get_revenue_stats(&self) -> RpcResult<RevenueStatsDto> {
        let stats = self.engine.revenue().stats();
        Ok(RevenueStatsDto {
            total_settled_volume: stats.total_settled_volume.to_string(),
            developer_share: stats.developer_share.to_string(),
            validator_pool_share: stats.validator_pool_share.to_string(),
            protocol_treasury_share: stats.protocol_treasury_share.to_string(),
        })
    }

    async fn get_top_performing_validators(&self, limit: usize) -> RpcResult<Vec<ValidatorRevenueEntry>> {
        Ok(self
            .engine
            .revenue()
            .top_validators(limit)
            .into_iter()
            .map(|(validator, revenue)| ValidatorRevenueEntry {
                validator,
                revenue: revenue.to_string(),
            })
            .collect())
    }

    async fn set_validator_fee_share(&self, fraction: f64) -> RpcResult<()> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(invalid_params("fraction must be within [0.0, 1.0]"));
        }
        let validator_pool_bps = (fraction * 10_000.0).round() as u16;
        let remaining = 10_000u16.saturating_sub(validator_pool_bps);
        let developer_bps = ((remaining as u32 * 9) / 10) as u16;
        let protocol_treasury_bps = remaining - developer_bps;

        self.engine
            .revenue()
            .set_split(RevenueSplit {
                developer_bps,
                validator_pool_bps,
                protocol_treasury_bps,
            })
            .map_err(invalid_params)
    }

    async fn set_distribution_mode(&self, mode: String) -> RpcResult<()> {
        let mode = match mode.as_str() {
            "proportional_to_settled_volume" => DistributionMode::ProportionalToSettledVolume,
            "equal_per_validator" => DistributionMode::EqualPerValidator,
            "performance_weighted" => DistributionMode::PerformanceWeighted,
            other => return Err(invalid_params(format!("unknown distribution mode: {other}"))),
        };
        self.engine.revenue().set_distribution_mode(mode);
        Ok(())
    }
}
