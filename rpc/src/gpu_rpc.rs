//! The `gpu_*` JSON-RPC namespace (spec §4.8): read-only introspection into the GPU batch
//! processor and hybrid scheduler.

use std::sync::Arc;

use jsonrpsee::core::{RpcResult, async_trait};
use jsonrpsee::proc_macros::rpc;
use serde::{Deserialize, Serialize};

use splendor_gpu::{GpuBackend, GpuProcessor};
use splendor_hybrid_scheduler::HybridScheduler;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueDepthsDto {
    pub hash: usize,
    pub signature: usize,
    pub tx: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuSectionDto {
    #[serde(rename = "type")]
    pub backend_type: String,
    pub device_count: u32,
    pub available: bool,
    pub queues: QueueDepthsDto,
    pub utilization: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinerSectionDto {
    pub gpu_enabled: bool,
}

/// `gpu_getGPUStats`'s response shape, per spec §4.8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuStatsDto {
    pub gpu: GpuSectionDto,
    pub miner: MinerSectionDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuConfigDto {
    pub preferred_backend: String,
    pub max_batch_size: usize,
    pub threshold: usize,
    pub hash_workers: usize,
    pub signature_workers: usize,
    pub tx_decode_workers: usize,
    pub pipelining_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuHealthDto {
    pub backend: String,
    pub healthy: bool,
    pub fallback_active: bool,
    pub hash_fallbacks: u64,
    pub signature_fallbacks: u64,
    pub tx_decode_fallbacks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TpsMonitoringDto {
    pub current_tps: f64,
    pub cpu_utilization: f64,
    pub gpu_utilization: f64,
    pub avg_latency_ms: f64,
    pub queue_depth: usize,
    pub strategy: String,
}

#[rpc(server, namespace = "gpu")]
pub trait GpuRpc {
    #[method(name = "getGPUStats")]
    async fn get_gpu_stats(&self) -> RpcResult<GpuStatsDto>;

    #[method(name = "getGPUConfig")]
    async fn get_gpu_config(&self) -> RpcResult<GpuConfigDto>;

    #[method(name = "getGPUHealth")]
    async fn get_gpu_health(&self) -> RpcResult<GpuHealthDto>;

    #[method(name = "getTPSMonitoring")]
    async fn get_tps_monitoring(&self) -> RpcResult<TpsMonitoringDto>;
}

/// Backs the `gpu` namespace by reading live stats out of shared [`GpuProcessor`]/
/// [`HybridScheduler`] handles, without owning either — both are driven by the node's own
/// batch-submission call sites.
pub struct GpuRpcImpl {
    gpu: Arc<GpuProcessor>,
    scheduler: Arc<HybridScheduler>,
    gpu_enabled: bool,
    config: GpuConfigDto,
}

impl GpuRpcImpl {
    pub fn new(
        gpu: Arc<GpuProcessor>,
        scheduler: Arc<HybridScheduler>,
        gpu_enabled: bool,
        config: GpuConfigDto,
    ) -> Self {
        GpuRpcImpl {
            gpu,
            scheduler,
            gpu_enabled,
            config,
        }
    }
}

fn backend_name(backend: GpuBackend) -> String {
    backend.to_string()
}

#[async_trait]
impl GpuRpcServer for GpuRpcImpl {
    async fn get_gpu_stats(&self) -> RpcResult<GpuStatsDto> {
        let backend = self.gpu.backend();
        let queues = self.gpu.queue_depths();
        let hybrid = self.scheduler.stats();

        Ok(GpuStatsDto {
            gpu: GpuSectionDto {
                backend_type: backend_name(backend),
                device_count: if backend == GpuBackend::None { 0 } else { 1 },
                available: backend != GpuBackend::None,
                queues: QueueDepthsDto {
                    hash: queues.hash,
                    signature: queues.signature,
                    tx: queues.tx_decode,
                },
                utilization: hybrid.gpu_utilization,
            },
            miner: MinerSectionDto {
                gpu_enabled: self.gpu_enabled,
            },
        })
    }

    async fn get_gpu_config(&self) -> RpcResult<GpuConfigDto> {
        Ok(self.config.clone())
    }

    async fn get_gpu_health(&self) -> RpcResult<GpuHealthDto> {
        let backend = self.gpu.backend();
        let stats = self.gpu.stats();
        Ok(GpuHealthDto {
            backend: backend_name(backend),
            healthy: true,
            fallback_active: backend == GpuBackend::None,
            hash_fallbacks: stats.hash.fallbacks(),
            signature_fallbacks: stats.signature.fallbacks(),
            tx_decode_fallbacks: stats.tx_decode.fallbacks(),
        })
    }

    async fn get_tps_monitoring(&self) -> RpcResult<TpsMonitoringDto> {
        let hybrid = self.scheduler.stats();
        Ok(TpsMonitoringDto {
            current_tps: hybrid.current_tps,
            cpu_utilization: hybrid.cpu_utilization,
            gpu_utilization: hybrid.gpu_utilization,
            avg_latency_ms: hybrid.avg_latency_ms,
            queue_depth: hybrid.queue_depth,
            strategy: format!("{:?}", hybrid.strategy),
        })
    }
}
