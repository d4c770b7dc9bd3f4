//! PQ consensus hooks (C4): embeds and verifies an optional ML-DSA seal in the block header
//! extra field alongside the base ECDSA seal during the PQT fork transition.

pub mod error;
pub mod fork;
pub mod header;
pub mod registry;
pub mod seal;
pub mod validator_set;

pub use error::ConsensusError;
pub use fork::{ForkState, fork_state};
pub use header::{HeaderExtra, MAX_EXTRA_LEN, PqSeal};
pub use registry::{DEFAULT_ROTATION_INTERVAL_BLOCKS, PqKeyEntry, PqKeyRegistry};
pub use seal::{derive_pq_signer, seal_block, verify_header};
pub use validator_set::{InMemoryValidatorSet, ValidatorSetView, recency_bound};
