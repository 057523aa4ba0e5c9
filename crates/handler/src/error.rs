//! Error types for the reconciliation handler.

use glvar_gitlab::GitLabError;
use glvar_secrets::SecretError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using the handler error type.
pub type Result<T> = std::result::Result<T, HandlerError>;

/// Errors that abort an invocation.
///
/// Nothing is retried locally; every variant is reported to the provisioning
/// framework as a failed operation.
#[derive(Error, Debug, Diagnostic)]
pub enum HandlerError {
    /// `RequestType` is not Create, Update or Delete.
    #[error("Invalid event: unsupported request type '{request_type}'")]
    #[diagnostic(
        code(glvar::invalid_event_kind),
        help("CloudFormation sends Create, Update or Delete")
    )]
    InvalidEventKind {
        /// Request type as received
        request_type: String,
    },

    /// Update or Delete arrived without the identifier assigned on Create.
    #[error("{request_type} event has no PhysicalResourceId")]
    #[diagnostic(code(glvar::missing_physical_id))]
    MissingPhysicalId {
        /// Request type as received
        request_type: String,
    },

    /// The physical identifier is not `server#project#variable`.
    #[error("Could not find project and variable from resource id '{physical_id}'")]
    #[diagnostic(
        code(glvar::malformed_physical_id),
        help("Expected '<server url>#<project id>#<variable name>'")
    )]
    MalformedPhysicalId {
        /// Identifier as received
        physical_id: String,
    },

    /// Resource properties are missing or unusable.
    #[error("Invalid resource properties: {reason}")]
    #[diagnostic(code(glvar::invalid_properties))]
    InvalidProperties {
        /// What is wrong
        reason: String,
    },

    /// The invocation payload is not a custom resource event.
    #[error("Invalid custom resource event: {0}")]
    #[diagnostic(code(glvar::invalid_event))]
    InvalidEvent(#[source] serde_json::Error),

    /// Secret resolution failed.
    #[error(transparent)]
    #[diagnostic(code(glvar::secret))]
    Secret(#[from] SecretError),

    /// GitLab API call failed.
    #[error(transparent)]
    #[diagnostic(code(glvar::gitlab))]
    GitLab(#[from] GitLabError),

    /// The CloudFormation response could not be delivered.
    #[error("Failed to send CloudFormation response: {message}")]
    #[diagnostic(code(glvar::response_failed))]
    ResponseFailed {
        /// Transport error or status returned by the response URL
        message: String,
    },
}

impl HandlerError {
    /// Create an invalid properties error
    #[must_use]
    pub fn invalid_properties(reason: impl Into<String>) -> Self {
        Self::InvalidProperties {
            reason: reason.into(),
        }
    }
}
