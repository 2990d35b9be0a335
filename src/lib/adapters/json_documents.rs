//! JSON boundary documents for the external prover and verifier.
//!
//! Every field value is a base-10 decimal string. Sibling arrays are
//! leaf-first and exactly as long as the tree's configured depth.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::crypto::field::FieldElement;
use crate::domain::bundle::{
    PrivateWitness, ProofBundle, PublicInputs, TreeDepths, VerifiedBundle,
};
use crate::domain::leaf::{LeafComposer, OwnershipLeafInputs};
use crate::domain::merkle::{MerkleProof, PRESENT};
use crate::error::ProofError;
use crate::ports::hasher::HashPrimitive;

/// Private input document (`input.json`): public fields then witness.
///
/// `disclosed_right_type` is absent; the circuit derives it as an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateInputDocument {
    pub ownership_root: FieldElement,
    pub schema_root: FieldElement,
    pub issuer_root: FieldElement,
    pub owner_commitment_public: FieldElement,
    pub area_threshold: FieldElement,
    pub district_expected: FieldElement,
    pub reveal_flag: FieldElement,

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

impl From<&VerifiedBundle> for PrivateInputDocument {
    fn from(verified: &VerifiedBundle) -> Self {
        let ProofBundle { public, witness, .. } = verified.bundle();
        Self {
            ownership_root: public.ownership_root,
            schema_root: public.schema_root,
            issuer_root: public.issuer_root,
            owner_commitment_public: public.owner_commitment_public,
            area_threshold: public.area_threshold,
            district_expected: public.district_expected,
            reveal_flag: public.reveal_flag,
            owner_secret: witness.owner_secret,
            parcel_id_hash: witness.parcel_id_hash,
            schema_hash: witness.schema_hash,
            issuer_id_hash: witness.issuer_id_hash,
            area_m2: witness.area_m2,
            district_id: witness.district_id,
            right_type: witness.right_type,
            ownership_siblings: witness.ownership_siblings.clone(),
            schema_siblings: witness.schema_siblings.clone(),
            issuer_siblings: witness.issuer_siblings.clone(),
        }
    }
}

impl PrivateInputDocument {
    fn witness(&self) -> PrivateWitness {
        PrivateWitness {
            owner_secret: self.owner_secret,
            parcel_id_hash: self.parcel_id_hash,
            schema_hash: self.schema_hash,
            issuer_id_hash: self.issuer_id_hash,
            area_m2: self.area_m2,
            district_id: self.district_id,
            right_type: self.right_type,
            ownership_siblings: self.ownership_siblings.clone(),
            schema_siblings: self.schema_siblings.clone(),
            issuer_siblings: self.issuer_siblings.clone(),
        }
    }

    fn public_inputs(&self) -> PublicInputs {
        PublicInputs {
            ownership_root: self.ownership_root,
            schema_root: self.schema_root,
            issuer_root: self.issuer_root,
            owner_commitment_public: self.owner_commitment_public,
            area_threshold: self.area_threshold,
            district_expected: self.district_expected,
            reveal_flag: self.reveal_flag,
            disclosed_right_type: self.right_type * self.reveal_flag,
        }
    }
}

/// The two documents of one verified bundle, written together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDocuments {
    pub private: PrivateInputDocument,
    pub public: PublicInputs,
}

impl From<&VerifiedBundle> for BundleDocuments {
    fn from(verified: &VerifiedBundle) -> Self {
        Self {
            private: PrivateInputDocument::from(verified),
            public: verified.bundle().public.clone(),
        }
    }
}

impl BundleDocuments {
    /// Write both documents atomically.
    ///
    /// Both are staged next to their targets and renamed into place. If any
    /// step fails, staged files and an already-renamed private document are
    /// removed, so neither document is left behind.
    pub fn write(&self, private_path: &Path, public_path: &Path) -> Result<(), ProofError> {
        let private_json = to_json(&self.private)?;
        let public_json = to_json(&self.public)?;

        let private_tmp = staging_path(private_path)?;
        let public_tmp = staging_path(public_path)?;

        let staged = fs::write(&private_tmp, private_json)
            .and_then(|()| fs::write(&public_tmp, public_json));
        if let Err(e) = staged {
            discard(&[private_tmp.as_path(), public_tmp.as_path()]);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&private_tmp, private_path) {
            discard(&[private_tmp.as_path(), public_tmp.as_path()]);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&public_tmp, public_path) {
            discard(&[public_tmp.as_path(), private_path]);
            return Err(e.into());
        }

        tracing::info!(
            private = %private_path.display(),
            public = %public_path.display(),
            "bundle documents written"
        );
        Ok(())
    }
}

/// Input of a standalone SMT verifier circuit (inclusion mode).
///
/// Field names follow circomlib's SMTVerifier, but `root` and `siblings` use
/// this crate's path layout: leaf-first, always full depth, padded with the
/// zero-hash chain, leaf node `H(key, value, 1)`. The consuming circuit must
/// walk paths the same way; circomlib's compressed root-first SMTVerifier
/// will reject this document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtVerifierInput {
    pub enabled: FieldElement,
    pub fnc: FieldElement,
    pub root: FieldElement,
    pub siblings: Vec<FieldElement>,
    pub old_key: FieldElement,
    pub old_value: FieldElement,
    pub is_old0: FieldElement,
    pub key: FieldElement,
    pub value: FieldElement,
}

impl From<&MerkleProof> for SmtVerifierInput {
    fn from(proof: &MerkleProof) -> Self {
        Self {
            enabled: FieldElement::ONE,
            // 0 selects inclusion; the old* fields only matter for exclusion.
            fnc: FieldElement::ZERO,
            root: proof.root,
            siblings: proof.siblings.clone(),
            old_key: FieldElement::ZERO,
            old_value: FieldElement::ZERO,
            is_old0: FieldElement::ZERO,
            key: proof.key,
            value: proof.value,
        }
    }
}

/// Re-verify a written private document, optionally against its public twin.
///
/// Proof keys are recomputed from the private fields, never trusted from the
/// document. Every sibling array must be exactly as long as its tree's depth
/// in `depths`.
pub fn check_documents<H: HashPrimitive>(
    hasher: &H,
    private: &PrivateInputDocument,
    public: Option<&PublicInputs>,
    depths: TreeDepths,
) -> Result<VerifiedBundle, ProofError> {
    let composer = LeafComposer::new(hasher);
    let ownership_key = composer.ownership_leaf(&OwnershipLeafInputs {
        parcel_id_hash: private.parcel_id_hash,
        owner_commitment: composer.owner_commitment(private.owner_secret)?,
        area_m2: private.area_m2,
        right_type: private.right_type,
        district_id: private.district_id,
        schema_hash: private.schema_hash,
        issuer_id_hash: private.issuer_id_hash,
    })?;

    let membership = |key: FieldElement, root: FieldElement, siblings: &[FieldElement]| MerkleProof {
        key,
        value: PRESENT,
        root,
        siblings: siblings.to_vec(),
    };

    let bundle = ProofBundle {
        public: private.public_inputs(),
        witness: private.witness(),
        ownership_proof: membership(ownership_key, private.ownership_root, &private.ownership_siblings),
        schema_proof: membership(private.schema_hash, private.schema_root, &private.schema_siblings),
        issuer_proof: membership(private.issuer_id_hash, private.issuer_root, &private.issuer_siblings),
        depths,
    };
    let verified = bundle.verify(hasher)?;

    if let Some(public) = public {
        if public != &verified.bundle().public {
            return Err(ProofError::VerificationMismatch {
                tree: "public document",
                reason: "not the public subset of the private document".to_string(),
            });
        }
    }

    Ok(verified)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ProofError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ProofError> {
    fs::write(path, to_json(value)?)?;
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ProofError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

fn staging_path(target: &Path) -> Result<PathBuf, ProofError> {
    let name = target.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a file", target.display()),
        )
    })?;
    let mut staged = OsString::from(".");
    staged.push(name);
    staged.push(".tmp");
    Ok(target.with_file_name(staged))
}

fn discard(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove partial document");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ProofBundleAssembler;
    use crate::crypto::poseidon::PoseidonHash;
    use crate::domain::merkle::leaf_node;
    use crate::domain::record::{DisclosurePolicy, LandTitleRecord, RightType};

    const DEPTHS: TreeDepths = TreeDepths {
        ownership: 16,
        schema: 8,
        issuer: 8,
    };

    fn verified(reveal: bool) -> VerifiedBundle {
        let record = LandTitleRecord {
            owner_secret: FieldElement::from(131415u64),
            parcel_id: "LAND-PARCEL-42".to_string(),
            area_m2: 150,
            right_type: RightType::FREEHOLD,
            district_id: 7,
            schema_id: "UgandaLandSchemaV1.0".to_string(),
            issuer_id: "MinistryOfLands".to_string(),
        };
        let policy = DisclosurePolicy {
            area_threshold: 100,
            district_expected: 7,
            reveal_right_type: reveal,
        };
        ProofBundleAssembler::new(PoseidonHash, DEPTHS)
            .unwrap()
            .assemble_verified(&record, &policy)
            .unwrap()
    }

    #[test]
    fn test_private_document_field_order_and_encoding() {
        let docs = BundleDocuments::from(&verified(true));
        let json = serde_json::to_string(&docs.private).unwrap();

        assert!(json.starts_with(r#"{"ownership_root":""#));
        assert!(json.contains(r#""owner_secret":"131415""#));
        assert!(json.contains(r#""area_m2":"150""#));
        assert!(json.contains(r#""reveal_flag":"1""#));
        assert!(!json.contains("disclosed_right_type"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ownership_siblings"].as_array().unwrap().len(), 16);
        assert_eq!(value["schema_siblings"][0], "0");
    }

    #[test]
    fn test_public_document_is_public_subset() {
        let docs = BundleDocuments::from(&verified(true));
        let value = serde_json::to_value(&docs.public).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 8);
        assert_eq!(object["disclosed_right_type"], "3");
        assert!(!object.contains_key("owner_secret"));
        assert_eq!(object["ownership_root"], serde_json::to_value(docs.private.ownership_root).unwrap());
    }

    #[test]
    fn test_check_documents_accepts_written_pair() {
        let docs = BundleDocuments::from(&verified(false));
        let checked = check_documents(&PoseidonHash, &docs.private, Some(&docs.public), DEPTHS).unwrap();
        assert_eq!(checked.bundle().public.disclosed_right_type, FieldElement::ZERO);
        check_documents(&PoseidonHash, &docs.private, None, DEPTHS).unwrap();
    }

    #[test]
    fn test_check_documents_rejects_tampering() {
        let docs = BundleDocuments::from(&verified(true));

        let mut private = docs.private.clone();
        private.district_id = FieldElement::from(8u64);
        assert!(matches!(
            check_documents(&PoseidonHash, &private, None, DEPTHS),
            Err(ProofError::VerificationMismatch { tree: "ownership", .. })
        ));

        let mut private = docs.private.clone();
        private.owner_secret = FieldElement::from(1u64);
        assert!(check_documents(&PoseidonHash, &private, None, DEPTHS).is_err());

        let mut public = docs.public.clone();
        public.disclosed_right_type = FieldElement::ZERO;
        assert!(matches!(
            check_documents(&PoseidonHash, &docs.private, Some(&public), DEPTHS),
            Err(ProofError::VerificationMismatch { tree: "public document", .. })
        ));
    }

    #[test]
    fn test_check_documents_enforces_configured_depth() {
        let docs = BundleDocuments::from(&verified(true));
        let err = check_documents(&PoseidonHash, &docs.private, None, TreeDepths::default()).unwrap_err();
        assert!(err.to_string().contains("expected 16 siblings, found 8"));
    }

    #[test]
    fn test_check_documents_rejects_empty_sibling_paths() {
        // With no siblings the root collapses to the leaf node itself.
        let docs = BundleDocuments::from(&verified(true));
        let bundle = check_documents(&PoseidonHash, &docs.private, None, DEPTHS)
            .unwrap()
            .into_inner();

        let mut private = docs.private.clone();
        private.ownership_siblings.clear();
        private.schema_siblings.clear();
        private.issuer_siblings.clear();
        private.ownership_root = leaf_node(&PoseidonHash, bundle.ownership_proof.key, PRESENT).unwrap();
        private.schema_root = leaf_node(&PoseidonHash, private.schema_hash, PRESENT).unwrap();
        private.issuer_root = leaf_node(&PoseidonHash, private.issuer_id_hash, PRESENT).unwrap();

        let err = check_documents(&PoseidonHash, &private, None, DEPTHS).unwrap_err();
        assert!(matches!(err, ProofError::VerificationMismatch { tree: "ownership", .. }));
        assert!(err.to_string().contains("expected 16 siblings, found 0"));
    }

    #[test]
    fn test_check_documents_rejects_zero_depth() {
        let docs = BundleDocuments::from(&verified(true));
        let depths = TreeDepths { schema: 0, ..DEPTHS };
        assert!(matches!(
            check_documents(&PoseidonHash, &docs.private, None, depths),
            Err(ProofError::InvalidDepth { depth: 0, .. })
        ));
    }

    #[test]
    fn test_smt_verifier_input_keys() {
        let bundle = verified(true);
        let input = SmtVerifierInput::from(&bundle.bundle().issuer_proof);
        let value = serde_json::to_value(&input).unwrap();
        for key in ["enabled", "fnc", "root", "siblings", "oldKey", "oldValue", "isOld0", "key", "value"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["enabled"], "1");
        assert_eq!(value["value"], "1");
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        let staged = staging_path(Path::new("/tmp/out/input.json")).unwrap();
        assert_eq!(staged, PathBuf::from("/tmp/out/.input.json.tmp"));
        assert!(staging_path(Path::new("/")).is_err());
    }
}
