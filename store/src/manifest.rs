//! Run manifest with checksums of written artifacts.
//!
//! After a run persists its artifacts, the manifest records which tool
//! version generated them, for which project and dialect, and the SHA-256
//! digest of every file. [`Manifest::verify`] later reports artifacts whose
//! content on disk no longer matches (hand edits, partial copies, etc.).
//!
//! # Examples
//!
//! ```no_run
//! use crudgen_store::Manifest;
//! use crudgen_synth::Artifact;
//!
//! let artifacts = vec![Artifact {
//!     path: "Domain/Entities/User.cs".into(),
//!     content: "public class User {}".into(),
//! }];
//! let manifest = Manifest::from_artifacts("0.1.0", "Shop", "mysql", &artifacts);
//! manifest.save("generated/crudgen-manifest.json").unwrap();
//!
//! let loaded = Manifest::load("generated/crudgen-manifest.json").unwrap();
//! assert!(loaded.verify("generated").unwrap().is_empty());
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use crudgen_synth::Artifact;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, StoreError};
use crate::writer::resolve_artifact_path;

/// File name of the manifest at the output root.
pub const MANIFEST_FILE: &str = "crudgen-manifest.json";

/// One written artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Path relative to the output root.
    pub path: String,
    /// SHA-256 hex digest of the content.
    pub checksum: String,
}

/// Top-level manifest of one generation run.
///
/// Persisted as pretty-printed JSON at the output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version (e.g., `"1.0"`).
    pub version: String,
    /// Version of the generator that produced the artifacts.
    pub tool_version: String,
    pub project: String,
    pub dialect: String,
    /// RFC 3339 timestamp of the run.
    pub generated_at: String,
    /// Written artifacts in run order.
    pub artifacts: Vec<ArtifactEntry>,
}

impl Manifest {
    /// Creates an empty manifest stamped with the current time.
    pub fn new(
        tool_version: impl Into<String>,
        project: impl Into<String>,
        dialect: impl Into<String>,
    ) -> Self {
        Self {
            version: "1.0".to_string(),
            tool_version: tool_version.into(),
            project: project.into(),
            dialect: dialect.into(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            artifacts: Vec::new(),
        }
    }

    /// Creates a manifest recording every artifact.
    pub fn from_artifacts(
        tool_version: impl Into<String>,
        project: impl Into<String>,
        dialect: impl Into<String>,
        artifacts: &[Artifact],
    ) -> Self {
        let mut manifest = Self::new(tool_version, project, dialect);
        for artifact in artifacts {
            manifest.record(artifact);
        }
        manifest
    }

    /// Appends an entry for `artifact`.
    pub fn record(&mut self, artifact: &Artifact) {
        self.artifacts.push(ArtifactEntry {
            path: artifact.path.clone(),
            checksum: checksum(artifact.content.as_bytes()),
        });
    }

    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be read, or
    /// [`JsonError`](crate::StoreError::JsonError) if the content is not valid
    /// manifest JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_json::from_reader(reader)?;
        Ok(manifest)
    }

    /// Saves the manifest as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be written,
    /// or [`JsonError`](crate::StoreError::JsonError) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// The manifest as an artifact at [`MANIFEST_FILE`], so it can be
    /// persisted together with the files it describes.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](crate::StoreError::JsonError) if serialization fails.
    pub fn to_artifact(&self) -> Result<Artifact> {
        Ok(Artifact {
            path: MANIFEST_FILE.to_string(),
            content: serde_json::to_string_pretty(self)?,
        })
    }

    /// Computes the SHA-256 hex digest of a file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be read.
    pub fn calculate_checksum(path: impl AsRef<Path>) -> Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(checksum(&bytes))
    }

    /// Returns the paths of recorded artifacts that are missing under `root`
    /// or whose checksum no longer matches, in manifest order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PathEscapesRoot`] for a tampered entry path, or
    /// [`StoreError::IoError`] for read failures other than a missing file.
    pub fn verify(&self, root: impl AsRef<Path>) -> Result<Vec<String>> {
        let root = root.as_ref();
        let mut mismatched = Vec::new();
        for entry in &self.artifacts {
            let path = resolve_artifact_path(root, &entry.path)?;
            match Self::calculate_checksum(&path) {
                Ok(actual) if actual == entry.checksum => {}
                Ok(_) => mismatched.push(entry.path.clone()),
                Err(StoreError::IoError(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                    mismatched.push(entry.path.clone())
                }
                Err(err) => return Err(err),
            }
        }
        Ok(mismatched)
    }
}

fn checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(path: &str, content: &str) -> Artifact {
        Artifact {
            path: path.into(),
            content: content.into(),
        }
    }

    #[test]
    fn test_known_digest() {
        let manifest = Manifest::from_artifacts("0.1.0", "Shop", "mysql", &[artifact("A.cs", "abc")]);
        assert_eq!(
            manifest.artifacts[0].checksum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(manifest.version, "1.0");
        assert!(manifest.generated_at.ends_with('Z'));
    }

    #[test]
    fn test_verify_reports_modified_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = [artifact("A.cs", "a"), artifact("B.cs", "b"), artifact("C.cs", "c")];
        for a in &artifacts {
            std::fs::write(dir.path().join(&a.path), &a.content).unwrap();
        }
        let manifest = Manifest::from_artifacts("0.1.0", "Shop", "mysql", &artifacts);
        assert!(manifest.verify(dir.path()).unwrap().is_empty());

        std::fs::write(dir.path().join("B.cs"), "edited").unwrap();
        std::fs::remove_file(dir.path().join("C.cs")).unwrap();
        assert_eq!(manifest.verify(dir.path()).unwrap(), vec!["B.cs", "C.cs"]);
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        let manifest = Manifest::from_artifacts("0.1.0", "Shop", "oracle", &[artifact("A.cs", "a")]);
        manifest.save(&path).unwrap();
        assert_eq!(Manifest::load(&path).unwrap(), manifest);
    }
}
