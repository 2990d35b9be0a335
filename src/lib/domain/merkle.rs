use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::crypto::field::FieldElement;
use crate::error::ProofError;
use crate::ports::hasher::HashPrimitive;

/// Deepest supported tree: one level per key bit (BN254 scalars are 254 bits).
pub const MAX_TREE_DEPTH: usize = 254;

/// Depth of the ownership tree in the reference deployment.
pub const DEFAULT_TREE_DEPTH: usize = 16;

/// Value stored against every committed leaf: "present".
pub const PRESENT: FieldElement = FieldElement::ONE;

pub fn validate_depth(depth: usize) -> Result<(), ProofError> {
    if depth == 0 || depth > MAX_TREE_DEPTH {
        return Err(ProofError::InvalidDepth {
            depth,
            max: MAX_TREE_DEPTH,
        });
    }
    Ok(())
}

/// Level-0 node for an entry: `H(key, value, 1)`.
pub fn leaf_node<H: HashPrimitive + ?Sized>(
    hasher: &H,
    key: FieldElement,
    value: FieldElement,
) -> Result<FieldElement, ProofError> {
    Ok(hasher.hash(&[key, value, FieldElement::ONE])?)
}

/// Membership proof in a fixed-depth sparse Merkle tree.
///
/// `siblings` is leaf-first: `siblings[i]` is the opposite subtree at level
/// `i`, and there is always exactly one sibling per level. Bit `i` of `key`
/// (LSB first) is `0` when the path node is the left child at level `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub key: FieldElement,
    pub value: FieldElement,
    pub root: FieldElement,
    pub siblings: Vec<FieldElement>,
}

impl MerkleProof {
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Direction bits along the path, leaf-first.
    pub fn path_bits(&self) -> Vec<u8> {
        (0..self.siblings.len())
            .map(|i| u8::from(self.key.bit(i)))
            .collect()
    }
}

/// Roots of empty subtrees: `z[0] = 0`, `z[i] = H(z[i-1], z[i-1])`.
///
/// Holds `depth + 1` entries; `z[depth]` is the root of an empty tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroHashChain {
    levels: Vec<FieldElement>,
}

impl ZeroHashChain {
    pub fn build<H: HashPrimitive + ?Sized>(hasher: &H, depth: usize) -> Result<Self, ProofError> {
        validate_depth(depth)?;

        let mut levels = Vec::with_capacity(depth + 1);
        let mut current = FieldElement::ZERO;
        levels.push(current);
        for _ in 0..depth {
            current = hasher.hash_pair(current, current)?;
            levels.push(current);
        }

        Ok(Self { levels })
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Empty-subtree hash at height `level`.
    pub fn at(&self, level: usize) -> FieldElement {
        self.levels[level]
    }

    pub fn empty_root(&self) -> FieldElement {
        self.levels[self.depth()]
    }

    pub fn levels(&self) -> &[FieldElement] {
        &self.levels
    }
}

/// Per-depth memo of zero-hash chains, shareable across threads.
///
/// Chains are immutable once built, so callers hold them through `Arc`
/// without any further locking.
#[derive(Debug, Default)]
pub struct ZeroHashCache {
    chains: Mutex<HashMap<usize, Arc<ZeroHashChain>>>,
}

impl ZeroHashCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build<H: HashPrimitive + ?Sized>(
        &self,
        hasher: &H,
        depth: usize,
    ) -> Result<Arc<ZeroHashChain>, ProofError> {
        if let Some(chain) = self.lock().get(&depth) {
            return Ok(Arc::clone(chain));
        }

        // Built outside the lock; a racing builder produces an identical chain.
        let chain = Arc::new(ZeroHashChain::build(hasher, depth)?);
        tracing::debug!(depth, empty_root = %chain.empty_root(), "zero-hash chain built");

        Ok(Arc::clone(self.lock().entry(depth).or_insert(chain)))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<usize, Arc<ZeroHashChain>>> {
        self.chains.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
