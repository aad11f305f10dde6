//! Core schema types and validation for the crudgen source generator.
//!
//! This crate defines the model a generation run works on:
//!
//! - [`Project`]: a named generation unit targeting one [`Dialect`].
//! - [`Entity`]: one aggregate to scaffold, with ordered properties and
//!   pre-insert / pre-update [`PreAction`]s.
//! - [`Property`]: a field with a storage column, a primitive kind, a
//!   primary-key flag and [`Validation`]s.
//! - [`Validation`] / [`Depends`]: a constraint and its optional
//!   conditional-activation clause.
//!
//! [`PrimitiveKind::spec`] is the single lookup table for everything that
//! depends on a primitive (target types, pagination filter shape, legal
//! `depends` states). [`naming`] holds the only name derivations used by the
//! synthesizers.
//!
//! Validation ([`validate_project`]) collects every structural and
//! cross-referential problem as a [`Diagnostic`] and returns a canonicalized
//! copy of the project. Faults that no schema edit can fix are
//! [`ConfigError`]s.
//!
//! # Example
//!
//! ```
//! use crudgen_core::*;
//!
//! let project = Project::new("Shop", "oracle").with_entity(
//!     Entity::new("User")
//!         .with_property(Property::new("Id", "ID", "int").primary_key())
//!         .with_property(
//!             Property::new("Email", "EMAIL", "string")
//!                 .with_validation(Validation::new("unique")),
//!         ),
//! );
//!
//! let validated = validate_project(&project).unwrap();
//! assert!(!validated.has_errors());
//! assert_eq!(project.dialect().unwrap().key_retrieval(), KeyRetrieval::OutputParameter);
//! ```

mod dialect;
mod error;
pub mod naming;
mod primitive;
mod types;
mod validate;

pub use dialect::{Dialect, KeyRetrieval};
pub use error::ConfigError;
pub use primitive::{PrimitiveKind, PrimitiveSpec, WhenState};
pub use types::*;
pub use validate::{Diagnostic, ValidatedProject, validate_project};
