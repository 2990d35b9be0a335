use crate::crypto::field::FieldElement;
use crate::ports::hasher::HashError;

/// Errors raised while building, verifying or exporting a proof bundle.
///
/// Every variant aborts the current assembly; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("key {key} not found in tree")]
    KeyNotFound { key: FieldElement },

    #[error("key {key} already holds value {existing}, refusing {attempted}")]
    DuplicateKey {
        key: FieldElement,
        existing: FieldElement,
        attempted: FieldElement,
    },

    #[error("keys {existing} and {attempted} share the same leaf slot at depth {depth}")]
    PathCollision {
        existing: FieldElement,
        attempted: FieldElement,
        depth: usize,
    },

    #[error("invalid tree depth {depth}: must be between 1 and {max}")]
    InvalidDepth { depth: usize, max: usize },

    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{tree} verification mismatch: {reason}")]
    VerificationMismatch { tree: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ProofError {
    fn from(err: serde_json::Error) -> Self {
        ProofError::Serialization(err.to_string())
    }
}
