//! Fixed-depth sparse Merkle tree over BN254 field elements.
//!
//! Entries are kept in insertion order and the root is derived on demand.
//! Empty subtrees hash to the zero-hash chain, so a tree of depth `D` never
//! materialises its `2^D` slots.

use std::sync::Arc;

use crate::crypto::field::FieldElement;
use crate::domain::merkle::{leaf_node, MerkleProof, ZeroHashChain};
use crate::error::ProofError;
use crate::ports::hasher::HashPrimitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    key: FieldElement,
    value: FieldElement,
}

/// Sparse Merkle tree keyed by the low `depth` bits of each key.
pub struct SparseMerkleTree<H: HashPrimitive> {
    hasher: H,
    zeros: Arc<ZeroHashChain>,
    entries: Vec<Entry>,
}

impl<H: HashPrimitive> SparseMerkleTree<H> {
    /// Create an empty tree of `depth`, computing its own zero-hash chain.
    pub fn new(hasher: H, depth: usize) -> Result<Self, ProofError> {
        let zeros = Arc::new(ZeroHashChain::build(&hasher, depth)?);
        Ok(Self::with_zero_hashes(hasher, zeros))
    }

    /// Create an empty tree reusing a precomputed chain; the depth is the chain's.
    pub fn with_zero_hashes(hasher: H, zeros: Arc<ZeroHashChain>) -> Self {
        Self {
            hasher,
            zeros,
            entries: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.zeros.depth()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn zero_hashes(&self) -> &ZeroHashChain {
        &self.zeros
    }

    pub fn get(&self, key: FieldElement) -> Option<FieldElement> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.value)
    }

    pub fn contains(&self, key: FieldElement) -> bool {
        self.get(key).is_some()
    }

    /// Record `(key, value)`. Re-inserting an identical pair is a no-op.
    pub fn insert(&mut self, key: FieldElement, value: FieldElement) -> Result<(), ProofError> {
        let depth = self.depth();
        for entry in &self.entries {
            if entry.key == key {
                if entry.value == value {
                    return Ok(());
                }
                return Err(ProofError::DuplicateKey {
                    key,
                    existing: entry.value,
                    attempted: value,
                });
            }
            if same_slot(entry.key, key, depth) {
                return Err(ProofError::PathCollision {
                    existing: entry.key,
                    attempted: key,
                    depth,
                });
            }
        }

        self.entries.push(Entry { key, value });
        Ok(())
    }

    /// Root over the current entry set.
    pub fn root(&self) -> Result<FieldElement, ProofError> {
        let all: Vec<&Entry> = self.entries.iter().collect();
        self.subtree_hash(&all, self.depth())
    }

    /// Leaf-first sibling path for `key`, exactly `depth` long.
    pub fn proof(&self, key: FieldElement) -> Result<MerkleProof, ProofError> {
        let value = self.get(key).ok_or(ProofError::KeyNotFound { key })?;

        let mut siblings = vec![FieldElement::ZERO; self.depth()];
        let mut on_path: Vec<&Entry> = self.entries.iter().collect();
        for height in (1..=self.depth()).rev() {
            let level = height - 1;
            let (same, other): (Vec<&Entry>, Vec<&Entry>) = on_path
                .into_iter()
                .partition(|e| e.key.bit(level) == key.bit(level));
            siblings[level] = self.subtree_hash(&other, level)?;
            on_path = same;
        }

        Ok(MerkleProof {
            key,
            value,
            root: self.root()?,
            siblings,
        })
    }

    fn subtree_hash(&self, entries: &[&Entry], height: usize) -> Result<FieldElement, ProofError> {
        match entries {
            [] => Ok(self.zeros.at(height)),
            [entry] if height == 0 => leaf_node(&self.hasher, entry.key, entry.value),
            _ => {
                // Collisions are refused on insert, so height 0 holds at most one entry.
                let level = height - 1;
                let (right, left): (Vec<&Entry>, Vec<&Entry>) =
                    entries.iter().copied().partition(|e| e.key.bit(level));
                let left_hash = self.subtree_hash(&left, level)?;
                let right_hash = self.subtree_hash(&right, level)?;
                Ok(self.hasher.hash_pair(left_hash, right_hash)?)
            }
        }
    }
}

fn same_slot(a: FieldElement, b: FieldElement, depth: usize) -> bool {
    (0..depth).all(|i| a.bit(i) == b.bit(i))
}
