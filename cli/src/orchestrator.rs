//! One generation run, stage by stage.
//!
//! `Load → Validate → Synthesize → Persist`. Each stage gates the next: a
//! load failure stops before validation, any diagnostic stops before
//! synthesis, and a configuration error from any synthesizer stops before
//! anything is written. Artifacts and the manifest are persisted as one
//! unit: a failed write leaves no partial set behind. There is no retry.

use std::path::PathBuf;

use crudgen_core::{validate_project, ConfigError, Diagnostic};
use crudgen_store::{load_project, persist, Manifest, StoreError};
use crudgen_synth::{synthesize, ArtifactKind};
use thiserror::Error;
use tracing::{debug, error, info};

/// Version recorded in run manifests.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Schema document (JSON, or YAML by extension).
    pub input: PathBuf,
    /// Output root for artifacts.
    pub output: PathBuf,
    /// Artifact kinds to emit; run order is fixed regardless of this order.
    pub kinds: Vec<ArtifactKind>,
    /// Write [`MANIFEST_FILE`](crudgen_store::MANIFEST_FILE) together with the artifacts.
    pub manifest: bool,
    /// Stop after validation.
    pub validate_only: bool,
}

impl RunConfig {
    /// Full generation of every artifact kind, with manifest.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            kinds: ArtifactKind::ALL.to_vec(),
            manifest: true,
            validate_only: false,
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub project: String,
    pub entities: usize,
    /// Files written, in run order. Empty for validate-only runs.
    pub written: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
}

/// Why a run stopped.
#[derive(Debug, Error)]
pub enum RunError {
    /// The schema document could not be read or parsed.
    #[error("failed to load schema: {0}")]
    Load(#[source] StoreError),
    /// The schema is inconsistent; no artifact was generated.
    #[error("schema has {} error(s)", .0.len())]
    Invalid(Vec<Diagnostic>),
    /// The generator does not support something the schema asks for.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Artifacts or the manifest could not be written.
    #[error("failed to write artifacts: {0}")]
    Persist(#[source] StoreError),
}

/// Drives one run.
pub struct Orchestrator;

impl Orchestrator {
    /// Runs every stage configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns the [`RunError`] of the first failing stage.
    pub fn run(config: &RunConfig) -> Result<RunReport, RunError> {
        debug!("Beginning of process");

        let project = load_project(&config.input).map_err(|err| {
            error!("{err}");
            RunError::Load(err)
        })?;

        let validated = validate_project(&project).inspect_err(|err| error!("{err}"))?;
        let project = validated.into_result().map_err(RunError::Invalid)?;
        info!("Project \"{}\" is valid", project.name);

        let mut report = RunReport {
            project: project.name.clone(),
            entities: project.entities.len(),
            ..RunReport::default()
        };
        if config.validate_only {
            return Ok(report);
        }

        let mut files = synthesize(&project, &config.kinds).inspect_err(|err| error!("{err}"))?;
        info!("Generated {} artifacts", files.len());

        if config.manifest {
            let manifest =
                Manifest::from_artifacts(TOOL_VERSION, &project.name, &project.dialect, &files)
                    .to_artifact()
                    .map_err(RunError::Persist)?;
            files.push(manifest);
        }

        let mut written = persist(&config.output, &files).map_err(|err| {
            error!("{err}");
            RunError::Persist(err)
        })?;
        if config.manifest {
            report.manifest = written.pop();
            if let Some(path) = &report.manifest {
                debug!("Wrote manifest {}", path.display());
            }
        }
        report.written = written;

        debug!("End of process");
        Ok(report)
    }
}
