//! Generation configuration.
//!
//! Defines the YAML-serializable configuration that selects which artifacts a
//! run emits, where they go, and whether a manifest is written.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! output: generated
//! artifacts: [model, query, repository, validator, service, controller]
//! manifest: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crudgen_synth::ArtifactKind;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level generation configuration.
///
/// Every field is optional in the document; missing fields take the
/// [`Default`] values (all artifacts, manifest on, no output override).
///
/// # Examples
///
/// ```
/// use crudgen_store::GenerationConfig;
/// use crudgen_synth::ArtifactKind;
///
/// let config: GenerationConfig = serde_yaml::from_str("artifacts: [service, model]").unwrap();
/// assert_eq!(config.selected(), vec![ArtifactKind::Model, ArtifactKind::Service]);
/// assert!(config.manifest);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Output root; a command-line `--output` takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Artifact kinds to emit.
    pub artifacts: Vec<ArtifactKind>,
    /// Write `crudgen-manifest.json` after persisting.
    pub manifest: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            output: None,
            artifacts: ArtifactKind::ALL.to_vec(),
            manifest: true,
        }
    }
}

impl GenerationConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be read, or
    /// [`YamlError`](crate::StoreError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be written,
    /// or [`YamlError`](crate::StoreError::YamlError) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Selected kinds in run order, without duplicates.
    pub fn selected(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| self.artifacts.contains(kind))
            .collect()
    }
}
