use crate::crypto::field::FieldElement;

/// Errors from a hash primitive.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("unsupported arity {arity}: expected 1..={max} inputs")]
    UnsupportedArity { arity: usize, max: usize },

    #[error("hash computation failed: {0}")]
    Backend(String),
}

/// Port for the algebraic hash that every commitment in the crate is built on.
///
/// Implementations must be deterministic and pure: equal input sequences map
/// to equal outputs, and input order matters.
///
/// Implementations:
/// - `PoseidonHash` (circom-compatible Poseidon over BN254)
pub trait HashPrimitive: Send + Sync {
    /// Hash an ordered, non-empty sequence of field elements to one element.
    fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, HashError>;

    /// Two-to-one compression used for internal tree nodes.
    fn hash_pair(&self, left: FieldElement, right: FieldElement) -> Result<FieldElement, HashError> {
        self.hash(&[left, right])
    }
}

impl<H: HashPrimitive + ?Sized> HashPrimitive for &H {
    fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, HashError> {
        (**self).hash(inputs)
    }
}

impl<H: HashPrimitive + ?Sized> HashPrimitive for std::sync::Arc<H> {
    fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, HashError> {
        (**self).hash(inputs)
    }
}
