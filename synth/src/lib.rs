//! Artifact synthesis for the crudgen source generator.
//!
//! Expands each entity of a validated [`Project`] into C# artifacts that
//! agree with each other on every shared name, type and parameter list:
//!
//! - [`ModelSynthesizer`]: the plain entity class.
//! - [`QuerySynthesizer`]: SQL constants, spelled per [`Dialect`](crudgen_core::Dialect).
//! - [`RepositorySynthesizer`]: the Dapper data-access interface and class.
//! - [`ValidatorSynthesizer`]: FluentValidation rules.
//! - [`ServiceSynthesizer`]: the service layer applying pre-actions.
//! - [`ControllerSynthesizer`]: the ASP.NET Core controller.
//!
//! Each synthesizer assembles a structured [`ast::SourceFile`] first and
//! renders it once. Synthesis is a pure function of the project: no I/O.
//!
//! # Example
//!
//! ```
//! use crudgen_core::*;
//! use crudgen_synth::{RepositorySynthesizer, Synthesizer};
//!
//! let project = Project::new("Shop", "mysql").with_entity(
//!     Entity::new("User")
//!         .with_property(Property::new("Id", "ID", "int").primary_key())
//!         .with_property(Property::new("Email", "EMAIL", "string")),
//! );
//!
//! let artifacts = RepositorySynthesizer.generate(&project).unwrap();
//! assert_eq!(artifacts[0].path, "Common/Repositories/UserRepository.cs");
//! assert!(artifacts[0].content.contains("ExistsByEmailAndDifferentThanIdAsync"));
//! ```

pub mod ast;
mod context;
mod controller;
mod model;
pub mod names;
mod operations;
pub mod pagination;
mod query;
pub mod render;
mod repository;
mod service;
mod validator;

use std::fmt;
use std::str::FromStr;

use crudgen_core::{ConfigError, Entity, Project};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use context::{EntityContext, Field};
pub use controller::ControllerSynthesizer;
pub use model::ModelSynthesizer;
pub use query::QuerySynthesizer;
pub use repository::RepositorySynthesizer;
pub use service::ServiceSynthesizer;
pub use validator::ValidatorSynthesizer;

/// One generated output unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// `/`-separated path relative to the output root.
    pub path: String,
    pub content: String,
}

/// A generated file before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub source: ast::SourceFile,
}

impl GeneratedFile {
    pub fn render(&self) -> Artifact {
        Artifact {
            path: self.path.clone(),
            content: render::render(&self.source),
        }
    }
}

/// Expands entities into one artifact kind.
pub trait Synthesizer {
    fn kind(&self) -> ArtifactKind;

    /// Builds the structured file for one entity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown dialect or primitive, a
    /// primary-key count other than one, or an unresolved reference.
    fn build(&self, project: &Project, entity: &Entity) -> Result<GeneratedFile, ConfigError>;

    /// Builds and renders the artifact for one entity.
    ///
    /// # Errors
    ///
    /// See [`Synthesizer::build`].
    fn generate_entity(&self, project: &Project, entity: &Entity) -> Result<Artifact, ConfigError> {
        Ok(self.build(project, entity)?.render())
    }

    /// One artifact per entity, in declaration order.
    ///
    /// # Errors
    ///
    /// Stops at the first [`ConfigError`]; no partial result is returned.
    fn generate(&self, project: &Project) -> Result<Vec<Artifact>, ConfigError> {
        project
            .entities
            .iter()
            .map(|entity| {
                debug!("Generating {} for \"{}\" entity", self.kind(), entity.name);
                self.generate_entity(project, entity)
            })
            .collect()
    }
}

/// Kind of artifact, one per synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Model,
    Query,
    Repository,
    Validator,
    Service,
    Controller,
}

impl ArtifactKind {
    /// Every kind, in run order.
    pub const ALL: [ArtifactKind; 6] = [
        Self::Model,
        Self::Query,
        Self::Repository,
        Self::Validator,
        Self::Service,
        Self::Controller,
    ];

    pub fn synthesizer(self) -> &'static dyn Synthesizer {
        match self {
            Self::Model => &ModelSynthesizer,
            Self::Query => &QuerySynthesizer,
            Self::Repository => &RepositorySynthesizer,
            Self::Validator => &ValidatorSynthesizer,
            Self::Service => &ServiceSynthesizer,
            Self::Controller => &ControllerSynthesizer,
        }
    }

    fn token(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Query => "query",
            Self::Repository => "repository",
            Self::Validator => "validator",
            Self::Service => "service",
            Self::Controller => "controller",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.token().eq_ignore_ascii_case(token.trim()))
            .ok_or_else(|| format!("unknown artifact kind: {token}"))
    }
}

/// Runs the selected synthesizers in run order ([`ArtifactKind::ALL`]),
/// whatever order `kinds` lists them in.
///
/// # Errors
///
/// Returns the first [`ConfigError`]; nothing generated before it is kept.
///
/// # Examples
///
/// ```
/// use crudgen_core::*;
/// use crudgen_synth::{ArtifactKind, synthesize};
///
/// let project = Project::new("Shop", "oracle").with_entity(
///     Entity::new("User").with_property(Property::new("Id", "ID", "int").primary_key()),
/// );
/// let artifacts = synthesize(&project, &ArtifactKind::ALL).unwrap();
/// assert_eq!(artifacts.len(), 6);
///
/// let broken = Project::new("Shop", "sybase").with_entity(project.entities[0].clone());
/// assert!(synthesize(&broken, &ArtifactKind::ALL).is_err());
/// ```
pub fn synthesize(project: &Project, kinds: &[ArtifactKind]) -> Result<Vec<Artifact>, ConfigError> {
    let mut artifacts = Vec::new();
    for kind in ArtifactKind::ALL.into_iter().filter(|kind| kinds.contains(kind)) {
        artifacts.extend(kind.synthesizer().generate(project)?);
    }
    Ok(artifacts)
}
