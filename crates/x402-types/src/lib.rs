#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Wire types for the x402 payment protocol.
//!
//! The Splendor node speaks a single x402 protocol version against a single scheme
//! (`exact`) on a single network, so unlike a multi-chain facilitator these types are
//! concrete structs rather than generic-over-chain-family templates.
//!
//! # Modules
//!
//! - [`requirements`] — [`requirements::PaymentRequirements`], the terms a seller publishes.
//! - [`payload`] — [`payload::PaymentPayload`] and the hex-encoded wire primitives it's built from.
//! - [`message`] — The canonical message construction and EIP-191 recovery used to check a payload's signature.
//! - [`response`] — [`response::VerifyResponse`] / [`response::SettleResponse`] and the [`response::ErrorReason`] taxonomy.

pub mod message;
pub mod payload;
pub mod requirements;
pub mod response;

pub use message::{canonical_message, recover_signer};
pub use payload::{EvmSignature, ExactPayload, HexEncodedNonce, PaymentPayload};
pub use requirements::PaymentRequirements;
pub use response::{ErrorReason, SettleResponse, VerifyResponse};
