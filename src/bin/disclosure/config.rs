use std::path::{Path, PathBuf};

use land_title_disclosure::domain::bundle::TreeDepths;
use land_title_disclosure::domain::merkle::{DEFAULT_TREE_DEPTH, MAX_TREE_DEPTH};
use land_title_disclosure::domain::record::{DisclosurePolicy, LandTitleRecord, RightType};
use land_title_disclosure::FieldElement;
use serde::Deserialize;

/// Input of `disclosure generate`, loaded from TOML.
#[derive(Debug, Deserialize)]
pub struct GenerateConfig {
    pub record: RecordConfig,
    pub policy: DisclosurePolicy,
    #[serde(default)]
    pub trees: TreesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Plaintext credential attributes.
#[derive(Debug, Deserialize)]
pub struct RecordConfig {
    /// Decimal or `0x` hex; reduced into the field.
    pub owner_secret: String,
    pub parcel_id: String,
    pub area_m2: u64,
    pub right_type: u8,
    pub district_id: u64,
    pub schema_id: String,
    pub issuer_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TreesConfig {
    #[serde(default = "default_depth")]
    pub ownership_depth: usize,
    #[serde(default = "default_depth")]
    pub schema_depth: usize,
    #[serde(default = "default_depth")]
    pub issuer_depth: usize,
}

impl Default for TreesConfig {
    fn default() -> Self {
        Self {
            ownership_depth: DEFAULT_TREE_DEPTH,
            schema_depth: DEFAULT_TREE_DEPTH,
            issuer_depth: DEFAULT_TREE_DEPTH,
        }
    }
}

/// Document file names, relative to the output directory.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_private_input")]
    pub private_input: PathBuf,
    #[serde(default = "default_public_input")]
    pub public_input: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            private_input: default_private_input(),
            public_input: default_public_input(),
        }
    }
}

fn default_depth() -> usize {
    DEFAULT_TREE_DEPTH
}

fn default_private_input() -> PathBuf {
    PathBuf::from("input.json")
}

fn default_public_input() -> PathBuf {
    PathBuf::from("public.json")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl GenerateConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, depth) in [
            ("trees.ownership_depth", self.trees.ownership_depth),
            ("trees.schema_depth", self.trees.schema_depth),
            ("trees.issuer_depth", self.trees.issuer_depth),
        ] {
            if depth == 0 || depth > MAX_TREE_DEPTH {
                return Err(ConfigError::Validation(format!(
                    "{name} must be between 1 and {MAX_TREE_DEPTH}, got {depth}"
                )));
            }
        }

        for (name, value) in [
            ("record.parcel_id", &self.record.parcel_id),
            ("record.schema_id", &self.record.schema_id),
            ("record.issuer_id", &self.record.issuer_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{name} must not be empty")));
            }
        }

        self.owner_secret()?;

        if self.output.private_input == self.output.public_input {
            return Err(ConfigError::Validation(
                "output.private_input and output.public_input must be different files".into(),
            ));
        }

        Ok(())
    }

    pub fn owner_secret(&self) -> Result<FieldElement, ConfigError> {
        self.record
            .owner_secret
            .parse()
            .map_err(|e| ConfigError::Validation(format!("record.owner_secret: {e}")))
    }

    pub fn record(&self) -> Result<LandTitleRecord, ConfigError> {
        Ok(LandTitleRecord {
            owner_secret: self.owner_secret()?,
            parcel_id: self.record.parcel_id.clone(),
            area_m2: self.record.area_m2,
            right_type: RightType(self.record.right_type),
            district_id: self.record.district_id,
            schema_id: self.record.schema_id.clone(),
            issuer_id: self.record.issuer_id.clone(),
        })
    }

    pub fn depths(&self) -> TreeDepths {
        TreeDepths {
            ownership: self.trees.ownership_depth,
            schema: self.trees.schema_depth,
            issuer: self.trees.issuer_depth,
        }
    }
}
