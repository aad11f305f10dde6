//! Schema loading, artifact persistence and run bookkeeping for crudgen.
//!
//! This crate is the I/O boundary of the generator: it reads schema
//! documents into [`crudgen_core::Project`] values, writes synthesized
//! artifacts below an output root, reads the YAML [`GenerationConfig`], and
//! records a [`Manifest`] of what was written.
//!
//! # Quick start
//!
//! ```no_run
//! use crudgen_store::{load_project, persist, GenerationConfig, Manifest};
//! use crudgen_synth::synthesize;
//!
//! let config = GenerationConfig::load("crudgen.yml").unwrap();
//! let project = load_project("shop.json").unwrap();
//! let mut files = synthesize(&project, &config.selected()).unwrap();
//!
//! let manifest = Manifest::from_artifacts("0.1.0", &project.name, &project.dialect, &files);
//! files.push(manifest.to_artifact().unwrap());
//! persist("generated", &files).unwrap();
//! ```

mod config;
mod error;
mod loader;
mod manifest;
mod writer;

pub use config::GenerationConfig;
pub use error::{Result, StoreError};
pub use loader::{load_project, parse_project, SchemaFormat};
pub use manifest::{ArtifactEntry, Manifest, MANIFEST_FILE};
pub use writer::{persist, resolve_artifact_path};
