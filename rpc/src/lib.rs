#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! JSON-RPC and HTTP surfaces the node exposes (C6, C8).
//!
//! # Modules
//!
//! - [`x402_rpc`] — the `x402_*` namespace: verify/settle, supported kinds, revenue analytics.
//! - [`gpu_rpc`] — the `gpu_*` namespace: read-only GPU/hybrid-scheduler introspection.
//! - [`http`] — the HTTP `402 Payment Required` middleware contract.
//! - [`error`] — [`error::X402HttpError`], the HTTP-path error taxonomy.

pub mod error;
pub mod gpu_rpc;
pub mod http;
pub mod x402_rpc;

pub use error::X402HttpError;
pub use gpu_rpc::{GpuRpcImpl, GpuRpcServer};
pub use http::{X402Gate, gated_router, x402_gate_middleware};
pub use x402_rpc::{X402RpcImpl, X402RpcServer};
