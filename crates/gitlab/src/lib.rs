//! GitLab project variable API for glvar.
//!
//! This crate provides:
//! - [`ProjectVariables`], the create/edit/delete contract the reconciliation
//!   handler calls
//! - [`GitLabClient`], a REST v4 implementation over `reqwest`
//! - [`GitLabConnector`] / [`HttpConnector`] to build a client per server URL
//!   and access token

#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use client::{GitLabClient, HttpConnector};
pub use error::{GitLabError, Result};
pub use types::{ProjectVariable, VariableOptions};

use async_trait::async_trait;
use glvar_secrets::SecureSecret;

/// Default GitLab server when none is configured
pub const DEFAULT_SERVER_URL: &str = "https://gitlab.com";

/// CI/CD variable operations on a single GitLab server.
#[async_trait]
pub trait ProjectVariables: Send + Sync {
    /// Create a new variable on a project.
    async fn create_variable(
        &self,
        project_id: &str,
        key: &str,
        value: &SecureSecret,
        options: VariableOptions,
    ) -> Result<ProjectVariable>;

    /// Replace the value and flags of an existing variable.
    async fn edit_variable(
        &self,
        project_id: &str,
        key: &str,
        value: &SecureSecret,
        options: VariableOptions,
    ) -> Result<ProjectVariable>;

    /// Remove a variable from a project.
    async fn delete_variable(&self, project_id: &str, key: &str) -> Result<()>;
}

/// Builds an authenticated [`ProjectVariables`] client for a server.
pub trait GitLabConnector: Send + Sync {
    /// Connect to `server_url` using `token` as bearer credential.
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError::InvalidServerUrl`] for unusable URLs and
    /// [`GitLabError::Http`] if the HTTP client cannot be built.
    fn connect(&self, server_url: &str, token: &SecureSecret)
    -> Result<Box<dyn ProjectVariables>>;
}
