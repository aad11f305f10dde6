//! Run orchestration for the `crudgen` binary.
//!
//! See [`Orchestrator`] for the `Load → Validate → Synthesize → Persist`
//! pipeline.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, RunConfig, RunError, RunReport};
