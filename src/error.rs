//! Error types for fieldcrm.
//!
//! The filter evaluator and the template renderer are total functions and
//! never produce these errors. They come from the surfaces around them:
//! reading files, parsing rule documents and queries, and editing the
//! in-memory template library.

use thiserror::Error;

/// Errors raised by fieldcrm operations.
#[derive(Debug, Error)]
pub enum CrmError {
    /// Configuration could not be read, parsed, or written.
    #[error("configuration error: {0}")]
    Config(String),

    /// A requested item does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A textual filter query could not be parsed.
    #[error("invalid filter: {0}")]
    Filter(String),

    /// A command-line argument was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A Terms & Conditions edit was refused.
    #[error("{0}")]
    Terms(String),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
