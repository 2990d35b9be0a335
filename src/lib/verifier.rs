//! Independent root recomputation for membership proofs.
//!
//! Shares nothing with the tree that produced a proof except the hash and
//! the path convention: leaf node `H(key, value, 1)`, leaf-first siblings,
//! bit `i` of the key selecting the side at level `i`.

use crate::crypto::field::FieldElement;
use crate::domain::merkle::{leaf_node, MerkleProof};
use crate::error::ProofError;
use crate::ports::hasher::HashPrimitive;

/// Stateless verifier; safe to share across any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootVerifier<H: HashPrimitive> {
    hasher: H,
}

impl<H: HashPrimitive> RootVerifier<H> {
    pub fn new(hasher: H) -> Self {
        Self { hasher }
    }

    /// Fold the sibling path over the leaf node and return the resulting root.
    pub fn recompute_root(&self, proof: &MerkleProof) -> Result<FieldElement, ProofError> {
        let mut current = leaf_node(&self.hasher, proof.key, proof.value)?;
        for (level, sibling) in proof.siblings.iter().enumerate() {
            current = if proof.key.bit(level) {
                self.hasher.hash_pair(*sibling, current)?
            } else {
                self.hasher.hash_pair(current, *sibling)?
            };
        }
        Ok(current)
    }

    /// Whether `proof.siblings` recombine to `proof.root`.
    pub fn verify(&self, proof: &MerkleProof) -> Result<bool, ProofError> {
        Ok(self.recompute_root(proof)? == proof.root)
    }

    /// Full hand-off check for one tree of a bundle.
    ///
    /// Fails with `VerificationMismatch` if the path length differs from the
    /// configured depth or the recomputed root differs from the claimed one.
    pub fn ensure(
        &self,
        tree: &'static str,
        proof: &MerkleProof,
        expected_depth: usize,
    ) -> Result<(), ProofError> {
        if proof.siblings.len() != expected_depth {
            return Err(ProofError::VerificationMismatch {
                tree,
                reason: format!(
                    "expected {expected_depth} siblings, found {}",
                    proof.siblings.len()
                ),
            });
        }

        let recomputed = self.recompute_root(proof)?;
        if recomputed != proof.root {
            return Err(ProofError::VerificationMismatch {
                tree,
                reason: format!("recomputed root {recomputed}, claimed {}", proof.root),
            });
        }

        tracing::debug!(tree, root = %proof.root, "membership proof verified");
        Ok(())
    }
}
