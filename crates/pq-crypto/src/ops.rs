//! Sign, verify, generate and batch-verify (spec §4.1).
//!
//! With the `pqcrypto` feature disabled, every operation here returns
//! [`MlDsaError::LibraryUnavailable`] — the node must still boot and run ECDSA-only chains
//! (spec §4.1 "Fallback mode").

use crate::algorithm::MlDsaAlgorithm;
use crate::error::MlDsaError;
use crate::sizes::sizes;

/// Verifies `signature` over `message` under `public_key`.
pub fn verify(
    algorithm: MlDsaAlgorithm,
    message: &[u8],
    signature: &[u8],
    public_key: &[u8],
) -> Result<(), MlDsaError> {
    if signature.is_empty() {
        return Err(MlDsaError::InvalidSignature);
    }
    if public_key.is_empty() {
        return Err(MlDsaError::InvalidPublicKey);
    }
    let (sig_len, pk_len) = sizes(algorithm);
    if signature.len() != sig_len {
        return Err(MlDsaError::InvalidLength {
            what: "signature",
            expected: sig_len,
            actual: signature.len(),
        });
    }
    if public_key.len() != pk_len {
        return Err(MlDsaError::InvalidLength {
            what: "public_key",
            expected: pk_len,
            actual: public_key.len(),
        });
    }
    backend::verify(algorithm, message, signature, public_key)
}

/// Generates a fresh `(public_key, secret_key)` keypair for `algorithm`.
pub fn generate(algorithm: MlDsaAlgorithm) -> Result<(Vec<u8>, Vec<u8>), MlDsaError> {
    backend::generate(algorithm)
}

/// Signs `message` under `secret_key`.
pub fn sign(
    algorithm: MlDsaAlgorithm,
    message: &[u8],
    secret_key: &[u8],
) -> Result<Vec<u8>, MlDsaError> {
    backend::sign(algorithm, message, secret_key)
}

/// Verifies `messages[i]`/`signatures[i]`/`public_keys[i]` independently, returning one
/// boolean per item. ML-DSA is lattice-based and has no amortized batching trick the way
/// elliptic-curve batch verification does (unlike e.g. `decaf377-rdsa`'s multiscalar
/// batch verifier) — this is a straightforward per-item loop.
pub fn batch_verify(
    algorithm: MlDsaAlgorithm,
    messages: &[&[u8]],
    signatures: &[&[u8]],
    public_keys: &[&[u8]],
) -> Result<Vec<bool>, MlDsaError> {
    if messages.len() != signatures.len() || messages.len() != public_keys.len() {
        return Err(MlDsaError::LengthMismatch);
    }
    Ok(messages
        .iter()
        .zip(signatures.iter())
        .zip(public_keys.iter())
        .map(|((message, signature), public_key)| {
            verify(algorithm, message, signature, public_key).is_ok()
        })
        .collect())
}

#[cfg(feature = "pqcrypto")]
mod backend {
    use super::*;
    use pqcrypto_dilithium::{dilithium2, dilithium3, dilithium5};
    use pqcrypto_traits::sign::{
        DetachedSignature as _, PublicKey as _, SecretKey as _,
    };

    pub fn verify(
        algorithm: MlDsaAlgorithm,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<(), MlDsaError> {
        macro_rules! verify_with {
            ($module:ident) => {{
                let sig = $module::DetachedSignature::from_bytes(signature)
                    .map_err(|_| MlDsaError::InvalidSignature)?;
                let pk = $module::PublicKey::from_bytes(public_key)
                    .map_err(|_| MlDsaError::InvalidPublicKey)?;
                $module::verify_detached_signature(&sig, message, &pk)
                    .map_err(|_| MlDsaError::VerificationFailed)
            }};
        }
        match algorithm {
            MlDsaAlgorithm::MlDsa44 => verify_with!(dilithium2),
            MlDsaAlgorithm::MlDsa65 => verify_with!(dilithium3),
            MlDsaAlgorithm::MlDsa87 => verify_with!(dilithium5),
        }
    }

    pub fn generate(algorithm: MlDsaAlgorithm) -> Result<(Vec<u8>, Vec<u8>), MlDsaError> {
        Ok(match algorithm {
            MlDsaAlgorithm::MlDsa44 => {
                let (pk, sk) = dilithium2::keypair();
                (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
            }
            MlDsaAlgorithm::MlDsa65 => {
                let (pk, sk) = dilithium3::keypair();
                (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
            }
            MlDsaAlgorithm::MlDsa87 => {
                let (pk, sk) = dilithium5::keypair();
                (pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
            }
        })
    }

    pub fn sign(
        algorithm: MlDsaAlgorithm,
        message: &[u8],
        secret_key: &[u8],
    ) -> Result<Vec<u8>, MlDsaError> {
        macro_rules! sign_with {
            ($module:ident) => {{
                let sk = $module::SecretKey::from_bytes(secret_key)
                    .map_err(|_| MlDsaError::InvalidSignature)?;
                let sig = $module::detached_sign(message, &sk);
                Ok(sig.as_bytes().to_vec())
            }};
        }
        match algorithm {
            MlDsaAlgorithm::MlDsa44 => sign_with!(dilithium2),
            MlDsaAlgorithm::MlDsa65 => sign_with!(dilithium3),
            MlDsaAlgorithm::MlDsa87 => sign_with!(dilithium5),
        }
    }
}

#[cfg(not(feature = "pqcrypto"))]
mod backend {
    use super::*;

    pub fn verify(
        _algorithm: MlDsaAlgorithm,
        _message: &[u8],
        _signature: &[u8],
        _public_key: &[u8],
    ) -> Result<(), MlDsaError> {
        Err(MlDsaError::LibraryUnavailable)
    }

    pub fn generate(_algorithm: MlDsaAlgorithm) -> Result<(Vec<u8>, Vec<u8>), MlDsaError> {
        Err(MlDsaError::LibraryUnavailable)
    }

    pub fn sign(
        _algorithm: MlDsaAlgorithm,
        _message: &[u8],
        _secret_key: &[u8],
    ) -> Result<Vec<u8>, MlDsaError> {
        Err(MlDsaError::LibraryUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "pqcrypto")]
    #[test]
    fn sign_then_verify_round_trips_for_all_variants() {
        for &algorithm in MlDsaAlgorithm::variants() {
            let (pk, sk) = generate(algorithm).unwrap();
            let message = b"splendor consensus seal hash placeholder";
            let signature = sign(algorithm, message, &sk).unwrap();
            assert!(verify(algorithm, message, &signature, &pk).is_ok());
        }
    }

    #[cfg(feature = "pqcrypto")]
    #[test]
    fn verify_fails_on_tampered_message() {
        let algorithm = MlDsaAlgorithm::MlDsa65;
        let (pk, sk) = generate(algorithm).unwrap();
        let signature = sign(algorithm, b"original", &sk).unwrap();
        let err = verify(algorithm, b"tampered", &signature, &pk).unwrap_err();
        assert!(matches!(err, MlDsaError::VerificationFailed));
    }

    #[test]
    fn verify_rejects_wrong_length_signature() {
        let algorithm = MlDsaAlgorithm::MlDsa65;
        let err = verify(algorithm, b"msg", &[0u8; 10], &[0u8; 1952]).unwrap_err();
        assert!(matches!(err, MlDsaError::InvalidLength { .. }));
    }

    #[test]
    fn verify_rejects_empty_signature_and_key() {
        let algorithm = MlDsaAlgorithm::MlDsa44;
        assert!(matches!(
            verify(algorithm, b"msg", &[], &[0u8; 1312]).unwrap_err(),
            MlDsaError::InvalidSignature
        ));
        assert!(matches!(
            verify(algorithm, b"msg", &[0u8; 2420], &[]).unwrap_err(),
            MlDsaError::InvalidPublicKey
        ));
    }

    #[test]
    fn batch_verify_rejects_length_mismatch() {
        let algorithm = MlDsaAlgorithm::MlDsa44;
        let err = batch_verify(algorithm, &[b"a", b"b"], &[b"sig"], &[b"pk"]).unwrap_err();
        assert!(matches!(err, MlDsaError::LengthMismatch));
    }

    #[cfg(feature = "pqcrypto")]
    #[test]
    fn batch_verify_reports_per_item_results() {
        let algorithm = MlDsaAlgorithm::MlDsa44;
        let (pk, sk) = generate(algorithm).unwrap();
        let good_sig = sign(algorithm, b"hello", &sk).unwrap();
        let (other_pk, _) = generate(algorithm).unwrap();

        let messages: [&[u8]; 2] = [b"hello", b"hello"];
        let signatures: [&[u8]; 2] = [&good_sig, &good_sig];
        let keys: [&[u8]; 2] = [&pk, &other_pk];

        let results = batch_verify(algorithm, &messages, &signatures, &keys).unwrap();
        assert_eq!(results, vec![true, false]);
    }
}
