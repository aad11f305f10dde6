//! Configuration errors.
//!
//! These are not schema mistakes a user fixes by editing the document; they
//! mean the generator was asked for something it does not implement. They
//! abort the run immediately and never enter the diagnostic log.

use thiserror::Error;

/// Fatal generator configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The project's dialect token names no implemented dialect.
    #[error("database \"{0}\" not implemented")]
    UnsupportedDialect(String),
    /// A property's primitive token names no implemented primitive.
    #[error("primitive \"{0}\" not implemented")]
    UnsupportedPrimitive(String),
    /// A validation's kind token names no implemented rule.
    #[error("validation \"{0}\" not implemented")]
    UnsupportedValidation(String),
    /// An entity reached synthesis without exactly one primary key.
    #[error("entity \"{entity}\" must declare exactly one primary key, found {found}")]
    PrimaryKey { entity: String, found: usize },
    /// A reference reached synthesis without being resolved by validation.
    #[error("entity \"{entity}\" references unknown property \"{reference}\"")]
    UnresolvedReference { entity: String, reference: String },
}
