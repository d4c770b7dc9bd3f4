//! ML-DSA parameter set identifiers and their translation to the linked library's names.

use std::fmt::{Display, Formatter};

/// An ML-DSA (FIPS-204) parameter set. The numeric suffix is the security category; the
/// library this crate links (`pqcrypto-dilithium`) still calls these Dilithium2/3/5, a
/// vocabulary the draft standard renamed but didn't change the math of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MlDsaAlgorithm {
    MlDsa44,
    MlDsa65,
    MlDsa87,
}

impl MlDsaAlgorithm {
    pub const fn variants() -> &'static [MlDsaAlgorithm] {
        &[
            MlDsaAlgorithm::MlDsa44,
            MlDsaAlgorithm::MlDsa65,
            MlDsaAlgorithm::MlDsa87,
        ]
    }

    /// The wire `type` byte used in the PQ seal TLV (spec §3).
    pub const fn tlv_type(self) -> u8 {
        match self {
            MlDsaAlgorithm::MlDsa65 => 0x01,
            MlDsaAlgorithm::MlDsa44 => 0x02,
            MlDsaAlgorithm::MlDsa87 => 0x03,
        }
    }

    pub const fn from_tlv_type(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(MlDsaAlgorithm::MlDsa65),
            0x02 => Some(MlDsaAlgorithm::MlDsa44),
            0x03 => Some(MlDsaAlgorithm::MlDsa87),
            _ => None,
        }
    }

    /// The name the linked library knows this parameter set by.
    pub const fn library_name(self) -> &'static str {
        match self {
            MlDsaAlgorithm::MlDsa44 => "Dilithium2",
            MlDsaAlgorithm::MlDsa65 => "Dilithium3",
            MlDsaAlgorithm::MlDsa87 => "Dilithium5",
        }
    }
}

impl Display for MlDsaAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MlDsaAlgorithm::MlDsa44 => "ML-DSA-44",
            MlDsaAlgorithm::MlDsa65 => "ML-DSA-65",
            MlDsaAlgorithm::MlDsa87 => "ML-DSA-87",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for MlDsaAlgorithm {
    type Err = crate::error::MlDsaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "44" | "ML-DSA-44" | "Dilithium2" => Ok(MlDsaAlgorithm::MlDsa44),
            "65" | "ML-DSA-65" | "Dilithium3" => Ok(MlDsaAlgorithm::MlDsa65),
            "87" | "ML-DSA-87" | "Dilithium5" => Ok(MlDsaAlgorithm::MlDsa87),
            _ => Err(crate::error::MlDsaError::InvalidAlgorithm(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tlv_type_round_trips() {
        for &algorithm in MlDsaAlgorithm::variants() {
            assert_eq!(
                MlDsaAlgorithm::from_tlv_type(algorithm.tlv_type()),
                Some(algorithm)
            );
        }
    }

    #[test]
    fn parses_numeric_and_library_names() {
        assert_eq!("65".parse::<MlDsaAlgorithm>().unwrap(), MlDsaAlgorithm::MlDsa65);
        assert_eq!(
            "Dilithium3".parse::<MlDsaAlgorithm>().unwrap(),
            MlDsaAlgorithm::MlDsa65
        );
    }
}
