//! Node configuration.
//!
//! Flat, env-first configuration in the style of the facilitator's CLI args: every field
//! binds to an environment variable (loaded from `.env` via `dotenvy` at startup) with a
//! hardcoded default, and `clap` handles parsing/validation so a bad value fails fast at
//! boot instead of surfacing as a confusing runtime error later.

use clap::Parser;
use std::net::IpAddr;

/// Which GPU backend to prefer when probing for hardware at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "UPPER")]
pub enum PreferredGpuType {
    Cuda,
    Opencl,
}

/// Full node configuration, parsed from environment variables (and `--flag` equivalents).
///
/// See [`Config::load`] for the loading order: `.env` file, then process environment,
/// then hardcoded defaults below.
#[derive(Parser, Debug, Clone)]
#[command(name = "splendor-node")]
#[command(about = "Splendor EVM-compatible node: GPU/CPU hybrid processing, x402 settlement, ML-DSA consensus")]
pub struct Config {
    /// Bind address for the JSON-RPC and x402 HTTP servers.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Bind port for the JSON-RPC and x402 HTTP servers.
    #[arg(long, env = "PORT", default_value_t = 8545)]
    pub port: u16,

    // --- GPU / hybrid scheduler (C2, C3) ---
    /// Enable the GPU batch-processing path. When `false` everything runs on the CPU fallback.
    #[arg(long, env = "ENABLE_GPU", default_value_t = true)]
    pub enable_gpu: bool,

    /// GPU backend probe order preference.
    #[arg(long, env = "PREFERRED_GPU_TYPE", value_enum, default_value_t = PreferredGpuType::Cuda)]
    pub preferred_gpu_type: PreferredGpuType,

    /// Maximum number of items in a single GPU batch.
    #[arg(long, env = "GPU_MAX_BATCH_SIZE", default_value_t = 10_000)]
    pub gpu_max_batch_size: usize,

    /// Minimum batch size below which work stays on the CPU path (GPU dispatch overhead
    /// isn't worth it for tiny batches).
    #[arg(long, env = "GPU_THRESHOLD", default_value_t = 1_000)]
    pub gpu_threshold: usize,

    /// Worker pool size for GPU hash batches.
    #[arg(long, env = "GPU_HASH_WORKERS", default_value_t = 32)]
    pub gpu_hash_workers: usize,

    /// Worker pool size for GPU signature-verification batches.
    #[arg(long, env = "GPU_SIGNATURE_WORKERS", default_value_t = 32)]
    pub gpu_signature_workers: usize,

    /// Worker pool size for GPU transaction-decode batches.
    #[arg(long, env = "GPU_TX_DECODE_WORKERS", default_value_t = 32)]
    pub gpu_tx_decode_workers: usize,

    /// Soft cap, in bytes, on GPU-resident memory across all batch queues.
    #[arg(long, env = "GPU_MAX_MEMORY_USAGE", default_value_t = 2_147_483_648)]
    pub gpu_max_memory_usage: u64,

    /// Allow successive batches to overlap (submit next while previous is still draining).
    #[arg(long, env = "GPU_ENABLE_PIPELINING", default_value_t = true)]
    pub gpu_enable_pipelining: bool,

    /// Target aggregate throughput (items/sec) the hybrid scheduler adapts toward.
    #[arg(long, env = "THROUGHPUT_TARGET", default_value_t = 50_000)]
    pub throughput_target: u64,

    /// Starting CPU/GPU split for the `HYBRID` strategy; `0.15` means 15% of a batch runs
    /// on the CPU path.
    #[arg(long, env = "CPU_GPU_RATIO", default_value_t = 0.15)]
    pub cpu_gpu_ratio: f64,

    /// Let the hybrid scheduler adjust `cpu_gpu_ratio` on its own over time.
    #[arg(long, env = "ADAPTIVE_LOAD_BALANCING", default_value_t = true)]
    pub adaptive_load_balancing: bool,

    /// Ceiling on CPU utilization the adaptive tick will not exceed.
    #[arg(long, env = "MAX_CPU_UTILIZATION", default_value_t = 0.85)]
    pub max_cpu_utilization: f64,

    /// Ceiling on GPU utilization the adaptive tick will not exceed.
    #[arg(long, env = "MAX_GPU_UTILIZATION", default_value_t = 0.90)]
    pub max_gpu_utilization: f64,

    // --- x402 settlement (C5, C6, C7) ---
    /// Master switch for the x402 HTTP-402 payment path.
    #[arg(long, env = "X402_ENABLED", default_value_t = true)]
    pub x402_enabled: bool,

    /// Minimum payment amount accepted, as a decimal string (e.g. `"0.001"`).
    #[arg(long, env = "X402_MIN_PAYMENT", default_value = "0.000001")]
    pub x402_min_payment: String,

    /// Maximum payment amount accepted, as a decimal string.
    #[arg(long, env = "X402_MAX_PAYMENT", default_value = "1000")]
    pub x402_max_payment: String,

    /// Seconds a `verify`'d payment remains eligible for `settle` before it expires.
    #[arg(long, env = "X402_SETTLEMENT_TIMEOUT", default_value_t = 300)]
    pub x402_settlement_timeout: u64,

    /// Enable the facilitator's per-payer request rate limiting.
    #[arg(long, env = "X402_RATE_LIMITING", default_value_t = true)]
    pub x402_rate_limiting: bool,

    /// Requests per minute allowed per payer when rate limiting is enabled.
    #[arg(long, env = "X402_MAX_REQUESTS_PER_MINUTE", default_value_t = 120)]
    pub x402_max_requests_per_minute: u32,

    /// Signature validation strictness. Only `strict` is implemented; reserved for a future
    /// permissive mode.
    #[arg(long, env = "X402_SIGNATURE_VALIDATION", default_value = "strict")]
    pub x402_signature_validation: String,

    /// Reject payment payloads whose authorization nonce has already been seen.
    #[arg(long, env = "X402_ENABLE_ANTI_REPLAY", default_value_t = true)]
    pub x402_enable_anti_replay: bool,

    // --- post-quantum consensus (C4) ---
    /// Block height at which ML-DSA seals become mandatory (`None` disables the transition
    /// entirely, i.e. classical-ECDSA-only).
    #[arg(long, env = "PQT_BLOCK")]
    pub pqt_block: Option<u64>,

    /// Length, in blocks, of the dual-signing window starting at `pqt_block`, during which
    /// both ECDSA and ML-DSA seals are accepted.
    #[arg(long, env = "TRANSITION_BLOCKS", default_value_t = 7200)]
    pub transition_blocks: u64,

    /// Default ML-DSA parameter set (44 ≈ Dilithium2, 65 ≈ Dilithium3, 87 ≈ Dilithium5).
    #[arg(long, env = "DEFAULT_ML_DSA_ALGORITHM", default_value_t = 65)]
    pub default_ml_dsa_algorithm: u16,
}

impl Config {
    /// Loads `.env` (if present), then parses configuration from the process environment.
    ///
    /// Mirrors the facilitator's startup sequence: a missing `.env` file is not an error,
    /// since production deployments set real environment variables directly.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Config::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_with_no_env() {
        let cfg = Config::parse_from(["splendor-node"]);
        assert_eq!(cfg.port, 8545);
        assert!(cfg.enable_gpu);
        assert_eq!(cfg.transition_blocks, 7200);
        assert_eq!(cfg.default_ml_dsa_algorithm, 65);
        assert_eq!(cfg.pqt_block, None);
    }
}
