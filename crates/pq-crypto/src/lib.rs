#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! ML-DSA (FIPS-204 / Dilithium) sign, verify, generate and batch-verify (C1).
//!
//! Backed by `pqcrypto-dilithium` behind the default-on `pqcrypto` feature. With the feature
//! disabled every signing operation returns [`error::MlDsaError::LibraryUnavailable`]; the
//! size table and algorithm enumeration still work (spec §4.1 "Fallback mode"), so a node
//! built without the PQ library still boots and runs ECDSA-only chains.
//!
//! # Modules
//!
//! - [`algorithm`] — [`algorithm::MlDsaAlgorithm`], the 44/65/87 parameter sets and their
//!   translation to the linked library's Dilithium2/3/5 vocabulary.
//! - [`sizes`] — runtime-queried vs. static signature/public-key sizes per variant.
//! - [`ops`] — [`ops::verify`], [`ops::sign`], [`ops::generate`], [`ops::batch_verify`].
//! - [`error`] — [`error::MlDsaError`].

pub mod algorithm;
pub mod error;
pub mod ops;
pub mod sizes;

pub use algorithm::MlDsaAlgorithm;
pub use error::MlDsaError;
pub use ops::{batch_verify, generate, sign, verify};
pub use sizes::{sizes as query_sizes, static_sizes};
