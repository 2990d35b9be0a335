use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonHasher};

use crate::crypto::field::FieldElement;
use crate::ports::hasher::{HashError, HashPrimitive};

/// Largest arity supported by the circom parameter sets.
pub const MAX_POSEIDON_INPUTS: usize = 12;

/// Circom-compatible Poseidon over the BN254 scalar field.
///
/// A fresh parameter set is instantiated per call, so one `PoseidonHash`
/// can be shared freely across threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct PoseidonHash;

impl PoseidonHash {
    pub fn new() -> Self {
        Self
    }
}

impl HashPrimitive for PoseidonHash {
    fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, HashError> {
        if inputs.is_empty() || inputs.len() > MAX_POSEIDON_INPUTS {
            return Err(HashError::UnsupportedArity {
                arity: inputs.len(),
                max: MAX_POSEIDON_INPUTS,
            });
        }

        let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())
            .map_err(|e| HashError::Backend(e.to_string()))?;
        let frs: Vec<Fr> = inputs.iter().map(|v| v.inner()).collect();
        let result = hasher
            .hash(&frs)
            .map_err(|e| HashError::Backend(e.to_string()))?;
        Ok(FieldElement::from(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poseidon_matches_circomlib_vector() {
        let out = PoseidonHash
            .hash(&[FieldElement::from(1u64), FieldElement::from(2u64)])
            .unwrap();
        assert_eq!(
            out.to_string(),
            "7853200120776062878684798364095072458815029376092732009249414926327459813530"
        );
    }

    #[test]
    fn test_poseidon_deterministic() {
        let input = [FieldElement::from(131415u64)];
        assert_eq!(PoseidonHash.hash(&input).unwrap(), PoseidonHash.hash(&input).unwrap());
    }

    #[test]
    fn test_poseidon_order_matters() {
        let a = FieldElement::from(1u64);
        let b = FieldElement::from(2u64);
        assert_ne!(PoseidonHash.hash_pair(a, b).unwrap(), PoseidonHash.hash_pair(b, a).unwrap());
    }

    #[test]
    fn test_poseidon_arity_bounds() {
        assert!(matches!(
            PoseidonHash.hash(&[]),
            Err(HashError::UnsupportedArity { arity: 0, .. })
        ));
        let too_many = vec![FieldElement::ONE; MAX_POSEIDON_INPUTS + 1];
        assert!(matches!(
            PoseidonHash.hash(&too_many),
            Err(HashError::UnsupportedArity { arity: 13, .. })
        ));
        let max = vec![FieldElement::ONE; MAX_POSEIDON_INPUTS];
        assert!(PoseidonHash.hash(&max).is_ok());
    }
}
