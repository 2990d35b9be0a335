//! Land-title selective-disclosure input builder.
//!
//! Encodes credential attributes into BN254 field elements, commits them into
//! three sparse Merkle trees (ownership, schema, issuer), extracts membership
//! proofs and assembles the public/private input documents consumed by an
//! external zero-knowledge prover. Every bundle is re-verified by an
//! independent root recomputation before it can be handed off.

pub mod adapters;
pub mod assembler;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod ports;
pub mod verifier;

pub use assembler::ProofBundleAssembler;
pub use crypto::field::FieldElement;
pub use crypto::poseidon::PoseidonHash;
pub use error::ProofError;
pub use verifier::RootVerifier;
