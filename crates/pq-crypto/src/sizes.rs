//! Signature and public-key sizes per ML-DSA variant.
//!
//! spec §4.1 asks for a *dynamic* query against the linked library first, falling back to
//! a static table when the library isn't linked. §9's Open Question documents that
//! different library builds have reported two different sizes for the 65/87 variants
//! (3309/3293 and 4627/4595 respectively); this module does not attempt to reconcile that,
//! it surfaces whatever the linked build actually reports.

use crate::algorithm::MlDsaAlgorithm;

/// `(signature_len, public_key_len)` from the static table (spec §4.1), used when the
/// `pqcrypto` feature is disabled.
pub const fn static_sizes(algorithm: MlDsaAlgorithm) -> (usize, usize) {
    match algorithm {
        MlDsaAlgorithm::MlDsa44 => (2420, 1312),
        MlDsaAlgorithm::MlDsa65 => (3309, 1952),
        MlDsaAlgorithm::MlDsa87 => (4627, 2592),
    }
}

#[cfg(feature = "pqcrypto")]
mod runtime {
    use super::*;
    use pqcrypto_dilithium::{dilithium2, dilithium3, dilithium5};
    use pqcrypto_traits::sign::{PublicKey as _, SecretKey as _};

    /// Queries the linked library's actual compiled sizes by generating a throwaway keypair
    /// and signature. This is the "runtime query" spec §4.1 prefers over the static table.
    pub fn query(algorithm: MlDsaAlgorithm) -> (usize, usize) {
        match algorithm {
            MlDsaAlgorithm::MlDsa44 => {
                let (pk, sk) = dilithium2::keypair();
                let sig = dilithium2::detached_sign(b"", &sk);
                (
                    pqcrypto_traits::sign::DetachedSignature::as_bytes(&sig).len(),
                    pk.as_bytes().len(),
                )
            }
            MlDsaAlgorithm::MlDsa65 => {
                let (pk, sk) = dilithium3::keypair();
                let sig = dilithium3::detached_sign(b"", &sk);
                (
                    pqcrypto_traits::sign::DetachedSignature::as_bytes(&sig).len(),
                    pk.as_bytes().len(),
                )
            }
            MlDsaAlgorithm::MlDsa87 => {
                let (pk, sk) = dilithium5::keypair();
                let sig = dilithium5::detached_sign(b"", &sk);
                (
                    pqcrypto_traits::sign::DetachedSignature::as_bytes(&sig).len(),
                    pk.as_bytes().len(),
                )
            }
        }
    }
}

/// `(signature_len, public_key_len)` for `algorithm`. Queries the linked library if the
/// `pqcrypto` feature is enabled, otherwise returns [`static_sizes`].
pub fn sizes(algorithm: MlDsaAlgorithm) -> (usize, usize) {
    #[cfg(feature = "pqcrypto")]
    {
        runtime::query(algorithm)
    }
    #[cfg(not(feature = "pqcrypto"))]
    {
        static_sizes(algorithm)
    }
}
