//! Error types for template synthesis.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the construct error type.
pub type Result<T> = std::result::Result<T, ConstructError>;

/// Errors raised while building a stack.
#[derive(Error, Debug, Diagnostic)]
pub enum ConstructError {
    /// Two constructs share a logical id.
    #[error("There is already a construct with id '{id}' in stack '{stack}'")]
    #[diagnostic(code(glvar_construct::duplicate_id))]
    DuplicateId {
        /// Offending id
        id: String,
        /// Stack name
        stack: String,
    },

    /// Logical ids must be alphanumeric.
    #[error("Invalid logical id '{id}': only ASCII letters and digits are allowed")]
    #[diagnostic(code(glvar_construct::invalid_id))]
    InvalidId {
        /// Offending id
        id: String,
    },

    /// Construct properties are unusable.
    #[error("Invalid properties for '{id}': {reason}")]
    #[diagnostic(code(glvar_construct::invalid_props))]
    InvalidProps {
        /// Construct id
        id: String,
        /// What is wrong
        reason: String,
    },

    /// The stack definition file cannot be read.
    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(glvar_construct::io))]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The stack definition is not valid YAML for the expected schema.
    #[error("Invalid stack definition: {0}")]
    #[diagnostic(
        code(glvar_construct::definition),
        help("Expected stackName and a list of variables")
    )]
    Definition(#[from] serde_yaml::Error),

    /// Template rendering failed.
    #[error("Failed to render template: {0}")]
    #[diagnostic(code(glvar_construct::render))]
    Render(#[from] serde_json::Error),
}
