use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, PrimeField};
use num_bigint::{BigInt, BigUint, Sign};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProofError;

/// Element of the BN254 scalar field.
///
/// Always held in canonical form `[0, p)`. Serialized as a base-10 string so
/// that values above 2^53 survive JSON consumers.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldElement(Fr);

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement(<Fr as Field>::ZERO);
    pub const ONE: FieldElement = FieldElement(<Fr as Field>::ONE);

    /// The field modulus `p`.
    pub fn modulus() -> BigUint {
        BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le())
    }

    /// Reduce an arbitrary signed integer into `[0, p)` with a Euclidean
    /// (non-negative) remainder.
    pub fn reduce(value: &BigInt) -> Self {
        let modulus = BigInt::from(Self::modulus());
        let remainder = ((value % &modulus) + &modulus) % &modulus;
        let (_, magnitude) = remainder.into_parts();
        Self::from_biguint(&magnitude)
    }

    fn from_biguint(value: &BigUint) -> Self {
        Self(Fr::from_le_bytes_mod_order(&value.to_bytes_le()))
    }

    /// Interpret little-endian bytes as an integer and reduce it.
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        Self(Fr::from_le_bytes_mod_order(bytes))
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.0.into_bigint().to_bytes_le())
    }

    /// Bit `index` of the canonical integer, least-significant first.
    pub fn bit(&self, index: usize) -> bool {
        self.0.into_bigint().get_bit(index)
    }

    pub fn inner(&self) -> Fr {
        self.0
    }
}

impl From<Fr> for FieldElement {
    fn from(value: Fr) -> Self {
        Self(value)
    }
}

impl From<FieldElement> for Fr {
    fn from(value: FieldElement) -> Self {
        value.0
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self(Fr::from(value))
    }
}

impl From<u8> for FieldElement {
    fn from(value: u8) -> Self {
        Self(Fr::from(value))
    }
}

impl From<bool> for FieldElement {
    fn from(value: bool) -> Self {
        if value {
            Self::ONE
        } else {
            Self::ZERO
        }
    }
}

impl Add for FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: FieldElement) -> FieldElement {
        FieldElement(self.0 + rhs.0)
    }
}

impl Mul for FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: FieldElement) -> FieldElement {
        FieldElement(self.0 * rhs.0)
    }
}

impl FromStr for FieldElement {
    type Err = ProofError;

    /// Accepts signed decimal or `0x`-prefixed hex; out-of-range values are reduced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            Some(hex) if !hex.is_empty() => {
                BigUint::parse_bytes(hex.as_bytes(), 16).map(|v| BigInt::from_biguint(Sign::Plus, v))
            }
            Some(_) => None,
            None if trimmed.is_empty() => None,
            None => BigInt::from_str(trimmed).ok(),
        };

        parsed
            .map(|value| Self::reduce(&value))
            .ok_or_else(|| ProofError::Parse(format!("not a field element: {s:?}")))
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_biguint())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_biguint())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
