//! Node startup and main run loop.
//!
//! Mirrors the teacher's `facilitator::run::run`: load config, initialize tracing, wire up
//! every subsystem behind a single shared [`CancellationToken`], and serve until a shutdown
//! signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use jsonrpsee::server::ServerBuilder;
use jsonrpsee::RpcModule;

use splendor_consensus_pq::PqKeyRegistry;
use splendor_core::config::Config;
use splendor_core::network::Network;
use splendor_core::shutdown::SigDown;
use splendor_gpu::backend::probe;
use splendor_gpu::processor::{GpuProcessor, GpuProcessorConfig};
use splendor_hybrid_scheduler::{HybridScheduler, SchedulerConfig, Strategy};
use splendor_rpc::gpu_rpc::{GpuConfigDto, GpuRpcImpl, GpuRpcServer};
use splendor_rpc::http::{X402Gate, gated_router};
use splendor_rpc::x402_rpc::{X402RpcImpl, X402RpcServer};
use splendor_tx_x402::InMemoryMempool;
use splendor_x402_engine::PaymentEngine;
use splendor_x402_engine::chain_state::in_memory::InMemoryChainState;
use splendor_x402_types::requirements::ExactScheme;
use splendor_x402_types::PaymentRequirements;

fn strategy_for(config: &Config) -> Strategy {
    if !config.enable_gpu {
        Strategy::CpuOnly
    } else {
        Strategy::Hybrid
    }
}

/// Example resource published behind the HTTP-402 gate, used until a real protected resource
/// is wired in by an embedding application (spec §4.6's "external middleware collaborator").
fn sample_requirements(network: Network, pay_to: alloy_primitives::Address) -> PaymentRequirements {
    PaymentRequirements {
        scheme: ExactScheme,
        network,
        max_amount_required: alloy_primitives::U256::from(1u64),
        resource: url::Url::parse("splendor://node/resource").expect("valid url"),
        description: "splendor node sample protected resource".into(),
        mime_type: "application/json".into(),
        pay_to,
        max_timeout_seconds: 300,
        asset: alloy_primitives::Address::ZERO,
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    splendor_core::telemetry::init();
    let config = Config::load();
    let network = Network::Splendor;

    let sig_down = SigDown::try_new()?;
    let cancel = sig_down.cancellation_token();

    // --- C2/C3: GPU processor + hybrid scheduler ---
    let probe_result = probe(config.preferred_gpu_type);
    let gpu_config = GpuProcessorConfig {
        hash_workers: config.gpu_hash_workers,
        signature_workers: config.gpu_signature_workers,
        tx_decode_workers: config.gpu_tx_decode_workers,
        ..GpuProcessorConfig::default()
    };
    let gpu = Arc::new(GpuProcessor::spawn(probe_result.backend, gpu_config, cancel.clone()));

    let strategy = strategy_for(&config);
    let scheduler_config = SchedulerConfig {
        strategy,
        cpu_gpu_ratio: config.cpu_gpu_ratio,
        gpu_threshold: config.gpu_threshold,
        throughput_target: config.throughput_target,
        max_cpu_utilization: config.max_cpu_utilization,
        max_gpu_utilization: config.max_gpu_utilization,
        ..SchedulerConfig::default()
    };
    let scheduler = HybridScheduler::new(gpu.clone(), scheduler_config);
    if config.adaptive_load_balancing {
        let ticker = scheduler.clone();
        let tick_cancel = cancel.clone();
        tokio::spawn(async move { ticker.run_adaptation_tick(tick_cancel).await });
    }

    // --- C4: PQ consensus key registry (rotation/verification wired in by the consensus
    // engine this node embeds; only the registry itself is owned here) ---
    let _pq_key_registry = PqKeyRegistry::new();

    // --- C5/C7: payment engine, mempool ---
    let chain_state = Arc::new(InMemoryChainState::new());
    let engine = Arc::new(PaymentEngine::new(network, chain_state));
    let mempool = Arc::new(InMemoryMempool::new(engine.clone()));

    // --- C6/C8: JSON-RPC surface ---
    let mut rpc_module = RpcModule::new(());
    rpc_module.merge(X402RpcImpl::new(network, engine.clone(), mempool.clone()).into_rpc())?;
    rpc_module.merge(
        GpuRpcImpl::new(
            gpu.clone(),
            scheduler.clone(),
            config.enable_gpu,
            GpuConfigDto {
                preferred_backend: format!("{:?}", config.preferred_gpu_type),
                max_batch_size: config.gpu_max_batch_size,
                threshold: config.gpu_threshold,
                hash_workers: config.gpu_hash_workers,
                signature_workers: config.gpu_signature_workers,
                tx_decode_workers: config.gpu_tx_decode_workers,
                pipelining_enabled: config.gpu_enable_pipelining,
            },
        )
        .into_rpc(),
    )?;

    let rpc_addr = SocketAddr::new(config.host, config.port);
    let rpc_server = ServerBuilder::new().build(rpc_addr).await?;
    tracing::info!(%rpc_addr, "starting JSON-RPC server");
    let rpc_handle = rpc_server.start(rpc_module);

    // --- HTTP-402 middleware, serving this node's sample resource ---
    let http_handle = if config.x402_enabled {
        let gate = X402Gate::new(
            sample_requirements(network, alloy_primitives::Address::ZERO),
            engine.clone(),
            mempool.clone(),
        );
        let app = gated_router(
            Router::new().route("/resource", get(|| async { "settled" })),
            gate,
        );
        let http_addr = SocketAddr::new(config.host, config.port + 1);
        let listener = tokio::net::TcpListener::bind(http_addr).await?;
        tracing::info!(%http_addr, "starting HTTP-402 server");
        let http_cancel = cancel.clone();
        Some(tokio::spawn(async move {
            let shutdown = async move { http_cancel.cancelled().await };
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
                tracing::error!(error = %e, "HTTP-402 server exited with an error");
            }
        }))
    } else {
        None
    };

    sig_down.recv().await;
    tracing::info!("shutdown signal received, stopping");
    rpc_handle.stop().ok();
    if let Some(handle) = http_handle {
        let _ = handle.await;
    }

    Ok(())
}
