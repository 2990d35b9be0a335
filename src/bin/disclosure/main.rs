//! Command-line front end for the land-title disclosure input builder.
//!
//! Run with:
//!   cargo run --bin disclosure -- generate --config configs/reference.toml --out-dir out
//!   cargo run --bin disclosure -- check --input out/input.json --public out/public.json

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

mod config;

use config::GenerateConfig;
use land_title_disclosure::adapters::json_documents::{
    check_documents, read_json, write_json, BundleDocuments, PrivateInputDocument,
    SmtVerifierInput,
};
use land_title_disclosure::adapters::sparse_tree::SparseMerkleTree;
use land_title_disclosure::domain::bundle::{PublicInputs, TreeDepths};
use land_title_disclosure::domain::merkle::{validate_depth, MerkleProof, DEFAULT_TREE_DEPTH};
use land_title_disclosure::{FieldElement, PoseidonHash, ProofBundleAssembler, ProofError, RootVerifier};

#[derive(Parser)]
#[command(name = "disclosure", about = "Land-title selective-disclosure proof inputs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble, verify and write the private and public input documents
    Generate {
        /// Path to the TOML configuration file
        #[arg(long, default_value = "./configs/reference.toml")]
        config: PathBuf,
        /// Directory the documents are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Re-verify a written private document and, optionally, its public twin
    Check {
        /// Private input document
        #[arg(long)]
        input: PathBuf,
        /// Public input document
        #[arg(long)]
        public: Option<PathBuf>,
        #[command(flatten)]
        depths: DepthArgs,
    },

    /// Verify a single membership proof (key, value, root, siblings)
    CheckRoot {
        #[arg(long)]
        input: PathBuf,
        /// Depth of the tree the proof was extracted from
        #[arg(long, default_value_t = DEFAULT_TREE_DEPTH)]
        depth: usize,
    },

    /// Build a tree from key=value entries and export an SMT verifier input.
    ///
    /// Siblings are leaf-first and full depth, padded with empty-subtree
    /// hashes, and leaves are H(key, value, 1). The target circuit must walk
    /// paths that way; circomlib's SMTVerifier expects a compressed,
    /// root-first path and will reject this document.
    SmtInput {
        /// Tree depth
        #[arg(long, default_value_t = 10)]
        depth: usize,
        /// Entry as key=value; repeatable
        #[arg(long = "entry", value_parser = parse_entry, required = true)]
        entries: Vec<(FieldElement, FieldElement)>,
        /// Key to prove
        #[arg(long)]
        key: FieldElement,
        /// Output file; stdout when absent
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Configured depth of each tree; every sibling array must match it exactly.
#[derive(clap::Args)]
struct DepthArgs {
    #[arg(long, default_value_t = DEFAULT_TREE_DEPTH)]
    ownership_depth: usize,
    #[arg(long, default_value_t = DEFAULT_TREE_DEPTH)]
    schema_depth: usize,
    #[arg(long, default_value_t = DEFAULT_TREE_DEPTH)]
    issuer_depth: usize,
}

impl From<DepthArgs> for TreeDepths {
    fn from(args: DepthArgs) -> Self {
        TreeDepths {
            ownership: args.ownership_depth,
            schema: args.schema_depth,
            issuer: args.issuer_depth,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("proof error: {0}")]
    Proof(#[from] ProofError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn parse_entry(s: &str) -> Result<(FieldElement, FieldElement), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    let key = key.trim().parse().map_err(|e: ProofError| e.to_string())?;
    let value = value.trim().parse().map_err(|e: ProofError| e.to_string())?;
    Ok((key, value))
}

fn generate(config_path: PathBuf, out_dir: PathBuf) -> Result<(), CliError> {
    info!("loading config from {}", config_path.display());
    let config = GenerateConfig::load(&config_path)?;
    let record = config.record()?;

    let assembler = ProofBundleAssembler::new(PoseidonHash, config.depths())?;
    let verified = assembler.assemble_verified(&record, &config.policy)?;

    let bundle = verified.bundle();
    info!(parcel_id = %record.parcel_id, hash = %bundle.witness.parcel_id_hash, "parcel id hash");
    info!(schema_id = %record.schema_id, hash = %bundle.witness.schema_hash, "schema hash");
    info!(issuer_id = %record.issuer_id, hash = %bundle.witness.issuer_id_hash, "issuer id hash");
    info!(
        ownership = %bundle.public.ownership_root,
        schema = %bundle.public.schema_root,
        issuer = %bundle.public.issuer_root,
        "roots"
    );
    info!(disclosed_right_type = %bundle.public.disclosed_right_type, "disclosure");

    std::fs::create_dir_all(&out_dir)?;
    BundleDocuments::from(&verified).write(
        &out_dir.join(&config.output.private_input),
        &out_dir.join(&config.output.public_input),
    )?;
    Ok(())
}

fn check(input: PathBuf, public: Option<PathBuf>, depths: TreeDepths) -> Result<(), CliError> {
    let private: PrivateInputDocument = read_json(&input)?;
    let public: Option<PublicInputs> = public.as_deref().map(read_json).transpose()?;

    let verified = check_documents(&PoseidonHash, &private, public.as_ref(), depths)?;
    let bundle = verified.bundle();
    info!(
        ownership = %bundle.public.ownership_root,
        schema = %bundle.public.schema_root,
        issuer = %bundle.public.issuer_root,
        public_checked = public.is_some(),
        "all membership proofs verified"
    );
    Ok(())
}

fn check_root(input: PathBuf, depth: usize) -> Result<(), CliError> {
    validate_depth(depth)?;
    let proof: MerkleProof = read_json(&input)?;
    let verifier = RootVerifier::new(PoseidonHash);

    let recomputed = verifier.recompute_root(&proof)?;
    info!(expected = %proof.root, %recomputed, depth = proof.depth(), "root recomputed");
    verifier.ensure("membership", &proof, depth)?;
    info!("root matches");
    Ok(())
}

fn smt_input(
    depth: usize,
    entries: Vec<(FieldElement, FieldElement)>,
    key: FieldElement,
    out: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut tree = SparseMerkleTree::new(PoseidonHash, depth)?;
    for (k, v) in entries {
        tree.insert(k, v)?;
    }
    info!(root = %tree.root()?, entries = tree.len(), "tree built");

    let proof = tree.proof(key)?;
    RootVerifier::new(PoseidonHash).ensure("membership", &proof, depth)?;
    let input = SmtVerifierInput::from(&proof);

    match out {
        Some(path) => {
            write_json(&path, &input)?;
            info!("wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&input).map_err(ProofError::from)?),
    }
    Ok(())
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Generate { config, out_dir } => generate(config, out_dir),
        Commands::Check {
            input,
            public,
            depths,
        } => check(input, public, depths.into()),
        Commands::CheckRoot { input, depth } => check_root(input, depth),
        Commands::SmtInput {
            depth,
            entries,
            key,
            out,
        } => smt_input(depth, entries, key, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry() {
        let (k, v) = parse_entry("7=77").unwrap();
        assert_eq!(k, FieldElement::from(7u64));
        assert_eq!(v, FieldElement::from(77u64));
        assert!(parse_entry("7").is_err());
        assert!(parse_entry("7=x").is_err());
    }

    #[test]
    fn test_cli_parses_smt_input() {
        let cli = Cli::try_parse_from([
            "disclosure", "smt-input", "--depth", "10", "--entry", "7=77", "--entry", "8=88", "--key", "7",
        ])
        .unwrap();
        match cli.command {
            Commands::SmtInput { depth, entries, key, out } => {
                assert_eq!(depth, 10);
                assert_eq!(entries.len(), 2);
                assert_eq!(key, FieldElement::from(7u64));
                assert!(out.is_none());
            }
            _ => panic!("expected smt-input"),
        }
    }

    #[test]
    fn test_generate_then_check() {
        let dir = tempfile::tempdir().unwrap();
        let config = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configs/reference.toml");
        generate(config, dir.path().to_path_buf()).unwrap();

        let input = dir.path().join("input.json");
        let public = dir.path().join("public.json");
        assert!(input.exists() && public.exists());
        check(input.clone(), Some(public.clone()), TreeDepths::default()).unwrap();

        let shallow = TreeDepths {
            ownership: 8,
            ..TreeDepths::default()
        };
        assert!(matches!(
            check(input, Some(public), shallow),
            Err(CliError::Proof(ProofError::VerificationMismatch { tree: "ownership", .. }))
        ));
    }

    #[test]
    fn test_cli_check_depths_default_to_sixteen() {
        let cli = Cli::try_parse_from(["disclosure", "check", "--input", "input.json", "--schema-depth", "8"])
            .unwrap();
        match cli.command {
            Commands::Check { depths, .. } => {
                let depths = TreeDepths::from(depths);
                assert_eq!(depths.ownership, DEFAULT_TREE_DEPTH);
                assert_eq!(depths.schema, 8);
                assert_eq!(depths.issuer, DEFAULT_TREE_DEPTH);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_check_root_rejects_short_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proof.json");

        let mut tree = SparseMerkleTree::new(PoseidonHash, 16).unwrap();
        tree.insert(FieldElement::from(42u64), FieldElement::ONE).unwrap();
        let mut proof = tree.proof(FieldElement::from(42u64)).unwrap();
        write_json(&path, &proof).unwrap();
        check_root(path.clone(), 16).unwrap();

        // An empty path whose root is the bare leaf node recombines trivially.
        proof.root = land_title_disclosure::domain::merkle::leaf_node(&PoseidonHash, proof.key, proof.value).unwrap();
        proof.siblings.clear();
        write_json(&path, &proof).unwrap();
        assert!(matches!(
            check_root(path.clone(), 16),
            Err(CliError::Proof(ProofError::VerificationMismatch { .. }))
        ));
        assert!(matches!(
            check_root(path, 0),
            Err(CliError::Proof(ProofError::InvalidDepth { depth: 0, .. }))
        ));
    }

    #[test]
    fn test_smt_input_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("smt.json");
        let entries = vec![
            (FieldElement::from(7u64), FieldElement::from(77u64)),
            (FieldElement::from(8u64), FieldElement::from(88u64)),
            (FieldElement::from(32u64), FieldElement::from(3232u64)),
        ];
        smt_input(10, entries, FieldElement::from(7u64), Some(out.clone())).unwrap();

        let doc: SmtVerifierInput = read_json(&out).unwrap();
        assert_eq!(doc.siblings.len(), 10);
        assert_eq!(doc.value, FieldElement::from(77u64));

        let missing = smt_input(10, vec![], FieldElement::from(7u64), None);
        assert!(matches!(missing, Err(CliError::Proof(ProofError::KeyNotFound { .. }))));
    }
}
