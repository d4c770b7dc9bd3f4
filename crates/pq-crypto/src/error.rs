//! Errors for ML-DSA sign/verify/generate operations (spec §7 "Validation errors").

#[derive(Debug, thiserror::Error)]
pub enum MlDsaError {
    #[error("unknown ML-DSA algorithm variant: {0}")]
    InvalidAlgorithm(String),

    #[error("buffer length {actual} does not match expected length {expected} for {what}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("signature is empty or malformed")]
    InvalidSignature,

    #[error("public key is empty or malformed")]
    InvalidPublicKey,

    #[error("signature did not verify against the given message and public key")]
    VerificationFailed,

    #[error("the ML-DSA library is not linked into this build")]
    LibraryUnavailable,

    #[error("signature/message/public-key arrays have mismatched lengths in batch_verify")]
    LengthMismatch,
}
