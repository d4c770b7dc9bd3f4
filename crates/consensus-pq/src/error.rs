//! Fatal consensus errors (spec §7 "Fatal/consensus errors: abort block acceptance").

#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    /// Block is at or past `fork_block + transition_blocks` (PostFork) and carries no PQ seal.
    #[error("block {block} is past the PQ enforcement boundary but carries no PQ seal")]
    MissingPQSeal { block: u64 },

    /// C1's ML-DSA verification failed against the recomputed seal hash.
    #[error("PQ seal signature did not verify: {0}")]
    InvalidPQSignature(#[from] splendor_pq_crypto::MlDsaError),

    /// In `DualSigning`, the ECDSA-recovered signer and the PQ-derived signer disagree.
    #[error("ECDSA signer {ecdsa} does not match PQ signer {pq}")]
    SignerMismatch {
        ecdsa: alloy_primitives::Address,
        pq: alloy_primitives::Address,
    },

    /// The header extra field, with the PQ seal spliced in, would exceed the hard maximum.
    #[error("header extra field would exceed the maximum size with the PQ seal spliced in")]
    ExtraTooLarge,

    /// The signer is not in the authorised validator set snapshotted at the parent block.
    #[error("signer {0} is not in the authorised validator set")]
    UnauthorisedSigner(alloy_primitives::Address),

    /// The signer signed too recently relative to the recency bound `⌊|signers|/2⌋+1`.
    #[error("signer {signer} signed within the last {bound} blocks")]
    RecencyViolation { signer: alloy_primitives::Address, bound: u64 },

    /// The header extra field is shorter or malformed relative to what it claims to encode.
    #[error("malformed header extra field: {0}")]
    MalformedExtra(&'static str),
}
