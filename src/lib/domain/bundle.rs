use serde::{Deserialize, Serialize};

use crate::crypto::field::FieldElement;
use crate::domain::leaf::{LeafComposer, OwnershipLeafInputs};
use crate::domain::merkle::{validate_depth, MerkleProof, DEFAULT_TREE_DEPTH, PRESENT};
use crate::error::ProofError;
use crate::ports::hasher::HashPrimitive;
use crate::verifier::RootVerifier;

pub const OWNERSHIP_TREE: &str = "ownership";
pub const SCHEMA_TREE: &str = "schema";
pub const ISSUER_TREE: &str = "issuer";

/// Configured depth of each tree domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDepths {
    #[serde(default = "default_depth")]
    pub ownership: usize,
    #[serde(default = "default_depth")]
    pub schema: usize,
    #[serde(default = "default_depth")]
    pub issuer: usize,
}

fn default_depth() -> usize {
    DEFAULT_TREE_DEPTH
}

impl Default for TreeDepths {
    fn default() -> Self {
        Self {
            ownership: DEFAULT_TREE_DEPTH,
            schema: DEFAULT_TREE_DEPTH,
            issuer: DEFAULT_TREE_DEPTH,
        }
    }
}

impl TreeDepths {
    pub fn validate(&self) -> Result<(), ProofError> {
        validate_depth(self.ownership)?;
        validate_depth(self.schema)?;
        validate_depth(self.issuer)
    }
}

/// Values the external verifier sees. Safe to disclose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInputs {
    pub ownership_root: FieldElement,
    pub schema_root: FieldElement,
    pub issuer_root: FieldElement,
    pub owner_commitment_public: FieldElement,
    pub area_threshold: FieldElement,
    pub district_expected: FieldElement,
    pub reveal_flag: FieldElement,
    pub disclosed_right_type: FieldElement,
}

/// Values only the prover sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateWitness {
    pub owner_secret: FieldElement,
    pub parcel_id_hash: FieldElement,
    pub schema_hash: FieldElement,
    pub issuer_id_hash: FieldElement,
    pub area_m2: FieldElement,
    pub district_id: FieldElement,
    pub right_type: FieldElement,
    pub ownership_siblings: Vec<FieldElement>,
    pub schema_siblings: Vec<FieldElement>,
    pub issuer_siblings: Vec<FieldElement>,
}

/// Everything one credential proof request needs, split by disclosure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofBundle {
    pub public: PublicInputs,
    pub witness: PrivateWitness,
    pub ownership_proof: MerkleProof,
    pub schema_proof: MerkleProof,
    pub issuer_proof: MerkleProof,
    pub depths: TreeDepths,
}

/// A bundle whose every proof and derived value has been re-checked.
///
/// Only obtainable through [`ProofBundle::verify`]; the document writers
/// accept nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedBundle(ProofBundle);

impl VerifiedBundle {
    pub fn bundle(&self) -> &ProofBundle {
        &self.0
    }

    pub fn into_inner(self) -> ProofBundle {
        self.0
    }
}

fn mismatch(tree: &'static str, reason: impl Into<String>) -> ProofError {
    ProofError::VerificationMismatch {
        tree,
        reason: reason.into(),
    }
}

impl ProofBundle {
    /// Re-derive commitments from the witness and recompute all three roots.
    pub fn verify<H: HashPrimitive>(self, hasher: &H) -> Result<VerifiedBundle, ProofError> {
        self.depths.validate()?;

        let composer = LeafComposer::new(hasher);
        let verifier = RootVerifier::new(hasher);
        let public = &self.public;
        let witness = &self.witness;

        if public.reveal_flag != FieldElement::ZERO && public.reveal_flag != FieldElement::ONE {
            return Err(mismatch("bundle", format!("reveal flag {} is not boolean", public.reveal_flag)));
        }
        let expected_disclosed = witness.right_type * public.reveal_flag;
        if public.disclosed_right_type != expected_disclosed {
            return Err(mismatch(
                "bundle",
                format!(
                    "disclosed right type {} should be {expected_disclosed}",
                    public.disclosed_right_type
                ),
            ));
        }

        let commitment = composer.owner_commitment(witness.owner_secret)?;
        if commitment != public.owner_commitment_public {
            return Err(mismatch("bundle", "owner commitment does not match owner secret"));
        }

        let ownership_leaf = composer.ownership_leaf(&OwnershipLeafInputs {
            parcel_id_hash: witness.parcel_id_hash,
            owner_commitment: commitment,
            area_m2: witness.area_m2,
            right_type: witness.right_type,
            district_id: witness.district_id,
            schema_hash: witness.schema_hash,
            issuer_id_hash: witness.issuer_id_hash,
        })?;

        let trees = [
            (
                OWNERSHIP_TREE,
                &self.ownership_proof,
                ownership_leaf,
                public.ownership_root,
                &witness.ownership_siblings,
                self.depths.ownership,
            ),
            (
                SCHEMA_TREE,
                &self.schema_proof,
                witness.schema_hash,
                public.schema_root,
                &witness.schema_siblings,
                self.depths.schema,
            ),
            (
                ISSUER_TREE,
                &self.issuer_proof,
                witness.issuer_id_hash,
                public.issuer_root,
                &witness.issuer_siblings,
                self.depths.issuer,
            ),
        ];

        for (tree, proof, expected_key, public_root, siblings, depth) in trees {
            if proof.key != expected_key {
                return Err(mismatch(tree, format!("proof key {} is not the committed leaf {expected_key}", proof.key)));
            }
            if proof.value != PRESENT {
                return Err(mismatch(tree, format!("proof value {} is not 1", proof.value)));
            }
            if proof.root != public_root {
                return Err(mismatch(tree, "proof root differs from public root"));
            }
            if &proof.siblings != siblings {
                return Err(mismatch(tree, "witness siblings differ from proof siblings"));
            }
            verifier.ensure(tree, proof, depth)?;
        }

        Ok(VerifiedBundle(self))
    }
}
