//! Builds a proof bundle for one land-title credential.
//!
//! Flow:
//! 1. Hash identifiers and the owner secret, compose the ownership leaf
//! 2. Commit each leaf into its own sparse Merkle tree (value `1`)
//! 3. Extract one membership proof per tree
//! 4. Split the values into public inputs and private witness

use crate::adapters::sparse_tree::SparseMerkleTree;
use crate::crypto::field::FieldElement;
use crate::domain::bundle::{
    ProofBundle, PrivateWitness, PublicInputs, TreeDepths, VerifiedBundle, ISSUER_TREE,
    OWNERSHIP_TREE, SCHEMA_TREE,
};
use crate::domain::leaf::LeafComposer;
use crate::domain::merkle::{MerkleProof, ZeroHashCache, PRESENT};
use crate::domain::record::{DisclosurePolicy, LandTitleRecord};
use crate::error::ProofError;
use crate::ports::hasher::HashPrimitive;

/// Assembles bundles with an injected hash primitive and per-domain depths.
///
/// Each `assemble` call owns its trees; the only shared state is the
/// read-mostly zero-hash cache, so one assembler can serve many threads.
pub struct ProofBundleAssembler<H: HashPrimitive> {
    hasher: H,
    depths: TreeDepths,
    zero_hashes: ZeroHashCache,
}

impl<H: HashPrimitive> ProofBundleAssembler<H> {
    pub fn new(hasher: H, depths: TreeDepths) -> Result<Self, ProofError> {
        depths.validate()?;
        Ok(Self {
            hasher,
            depths,
            zero_hashes: ZeroHashCache::new(),
        })
    }

    pub fn depths(&self) -> TreeDepths {
        self.depths
    }

    /// Build the bundle. Any error aborts the whole assembly.
    pub fn assemble(
        &self,
        record: &LandTitleRecord,
        policy: &DisclosurePolicy,
    ) -> Result<ProofBundle, ProofError> {
        if !policy.is_satisfied_by(record) {
            tracing::warn!(
                parcel_id = %record.parcel_id,
                area_m2 = record.area_m2,
                district_id = record.district_id,
                "record does not satisfy its disclosure policy; the circuit will reject it"
            );
        }

        let leaves = LeafComposer::new(&self.hasher).compose(record)?;

        let ownership_proof =
            self.single_leaf_proof(OWNERSHIP_TREE, leaves.ownership_leaf, self.depths.ownership)?;
        let schema_proof = self.single_leaf_proof(SCHEMA_TREE, leaves.schema_hash, self.depths.schema)?;
        let issuer_proof = self.single_leaf_proof(ISSUER_TREE, leaves.issuer_id_hash, self.depths.issuer)?;

        let public = PublicInputs {
            ownership_root: ownership_proof.root,
            schema_root: schema_proof.root,
            issuer_root: issuer_proof.root,
            owner_commitment_public: leaves.owner_commitment,
            area_threshold: FieldElement::from(policy.area_threshold),
            district_expected: FieldElement::from(policy.district_expected),
            reveal_flag: policy.reveal_flag(),
            disclosed_right_type: policy.disclosed_right_type(record.right_type),
        };

        let witness = PrivateWitness {
            owner_secret: record.owner_secret,
            parcel_id_hash: leaves.parcel_id_hash,
            schema_hash: leaves.schema_hash,
            issuer_id_hash: leaves.issuer_id_hash,
            area_m2: FieldElement::from(record.area_m2),
            district_id: FieldElement::from(record.district_id),
            right_type: FieldElement::from(record.right_type),
            ownership_siblings: ownership_proof.siblings.clone(),
            schema_siblings: schema_proof.siblings.clone(),
            issuer_siblings: issuer_proof.siblings.clone(),
        };

        tracing::info!(
            parcel_id = %record.parcel_id,
            ownership_root = %public.ownership_root,
            schema_root = %public.schema_root,
            issuer_root = %public.issuer_root,
            "proof bundle assembled"
        );

        Ok(ProofBundle {
            public,
            witness,
            ownership_proof,
            schema_proof,
            issuer_proof,
            depths: self.depths,
        })
    }

    /// Assemble and re-verify; the result is ready for hand-off.
    pub fn assemble_verified(
        &self,
        record: &LandTitleRecord,
        policy: &DisclosurePolicy,
    ) -> Result<VerifiedBundle, ProofError> {
        self.assemble(record, policy)?.verify(&self.hasher)
    }

    fn single_leaf_proof(
        &self,
        tree: &'static str,
        leaf: FieldElement,
        depth: usize,
    ) -> Result<MerkleProof, ProofError> {
        let zeros = self.zero_hashes.get_or_build(&self.hasher, depth)?;
        let mut smt = SparseMerkleTree::with_zero_hashes(&self.hasher, zeros);
        smt.insert(leaf, PRESENT)?;
        let proof = smt.proof(leaf)?;
        tracing::debug!(tree, depth, root = %proof.root, "tree committed");
        Ok(proof)
    }
}
