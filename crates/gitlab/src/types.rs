//! GitLab project variable wire types.

use serde::{Deserialize, Serialize};

/// Visibility flags of a CI/CD variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariableOptions {
    /// Only exposed to pipelines on protected branches and tags
    pub protected: bool,
    /// Hidden in job logs
    pub masked: bool,
}

impl VariableOptions {
    /// Protected, not masked
    #[must_use]
    pub const fn protected() -> Self {
        Self {
            protected: true,
            masked: false,
        }
    }
}

/// A project variable as returned by the API.
///
/// The value is deliberately not deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectVariable {
    /// Variable name
    pub key: String,
    /// `env_var` or `file`
    #[serde(default)]
    pub variable_type: Option<String>,
    /// Protected flag
    #[serde(default)]
    pub protected: bool,
    /// Masked flag
    #[serde(default)]
    pub masked: bool,
    /// Environment scope, `*` for all
    #[serde(default)]
    pub environment_scope: Option<String>,
}

/// Body of `POST /projects/:id/variables`
#[derive(Debug, Serialize)]
pub(crate) struct CreateVariableRequest<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub protected: bool,
    pub masked: bool,
}

/// Body of `PUT /projects/:id/variables/:key`
#[derive(Debug, Serialize)]
pub(crate) struct EditVariableRequest<'a> {
    pub value: &'a str,
    pub protected: bool,
    pub masked: bool,
}
