//! Splendor node entrypoint.
//!
//! This binary runs an EVM-compatible node that settles x402 payments as typed transactions
//! and accelerates batch hashing/signature-verification/tx-decoding across a CPU/GPU hybrid
//! pipeline.
//!
//! Endpoints:
//! - JSON-RPC `x402_*` / `gpu_*` namespaces on `HOST:PORT`
//! - HTTP `402 Payment Required` gate on `HOST:PORT+1`
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `HOST`, `PORT` control the JSON-RPC bind address

mod run;

use std::process;

use crate::run::run;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{e}");
        process::exit(1);
    }
}
