use crate::crypto::field::FieldElement;
use crate::crypto::packing::pack_str;
use crate::domain::record::LandTitleRecord;
use crate::error::ProofError;
use crate::ports::hasher::HashPrimitive;

/// Inputs of the ownership leaf, in hashing order.
///
/// The order is part of the commitment: permuting it produces a leaf the
/// circuit will not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipLeafInputs {
    pub parcel_id_hash: FieldElement,
    pub owner_commitment: FieldElement,
    pub area_m2: FieldElement,
    pub right_type: FieldElement,
    pub district_id: FieldElement,
    pub schema_hash: FieldElement,
    pub issuer_id_hash: FieldElement,
}

impl OwnershipLeafInputs {
    pub fn to_array(&self) -> [FieldElement; 7] {
        [
            self.parcel_id_hash,
            self.owner_commitment,
            self.area_m2,
            self.right_type,
            self.district_id,
            self.schema_hash,
            self.issuer_id_hash,
        ]
    }
}

/// Every hash derived from one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialLeaves {
    pub parcel_id_hash: FieldElement,
    pub schema_hash: FieldElement,
    pub issuer_id_hash: FieldElement,
    /// Public commitment `H(owner_secret)`.
    pub owner_commitment: FieldElement,
    pub ownership_leaf: FieldElement,
}

/// Maps attribute records and identifiers to leaf hashes.
pub struct LeafComposer<'a, H: HashPrimitive + ?Sized> {
    hasher: &'a H,
}

impl<'a, H: HashPrimitive + ?Sized> LeafComposer<'a, H> {
    pub fn new(hasher: &'a H) -> Self {
        Self { hasher }
    }

    /// `H(pack(s))`, the leaf for the schema and issuer trees.
    ///
    /// The packed chunks go into a single Poseidon call, so identifiers are
    /// limited to `12 * 31 = 372` bytes; longer ones fail with a `Hash` error
    /// rather than being truncated or hashed in several rounds.
    pub fn identifier_leaf(&self, identifier: &str) -> Result<FieldElement, ProofError> {
        Ok(self.hasher.hash(&pack_str(identifier))?)
    }

    /// `H(secret)`: binds the credential to its holder without revealing the secret.
    pub fn owner_commitment(&self, secret: FieldElement) -> Result<FieldElement, ProofError> {
        Ok(self.hasher.hash(&[secret])?)
    }

    pub fn ownership_leaf(&self, inputs: &OwnershipLeafInputs) -> Result<FieldElement, ProofError> {
        Ok(self.hasher.hash(&inputs.to_array())?)
    }

    /// Derive every leaf-level hash for `record`.
    pub fn compose(&self, record: &LandTitleRecord) -> Result<CredentialLeaves, ProofError> {
        let parcel_id_hash = self.identifier_leaf(&record.parcel_id)?;
        let schema_hash = self.identifier_leaf(&record.schema_id)?;
        let issuer_id_hash = self.identifier_leaf(&record.issuer_id)?;
        let owner_commitment = self.owner_commitment(record.owner_secret)?;

        let inputs = OwnershipLeafInputs {
            parcel_id_hash,
            owner_commitment,
            area_m2: FieldElement::from(record.area_m2),
            right_type: FieldElement::from(record.right_type),
            district_id: FieldElement::from(record.district_id),
            schema_hash,
            issuer_id_hash,
        };
        let ownership_leaf = self.ownership_leaf(&inputs)?;

        Ok(CredentialLeaves {
            parcel_id_hash,
            schema_hash,
            issuer_id_hash,
            owner_commitment,
            ownership_leaf,
        })
    }
}
