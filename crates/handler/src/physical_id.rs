//! Physical resource identifier codec
//!
//! The identifier CloudFormation keeps for a variable is
//! `<server url>#<project id>#<variable name>`. It is the only state that
//! survives between invocations, so encoding and decoding must be exact
//! inverses for segments that do not contain [`DELIMITER`].

use crate::error::{HandlerError, Result};
use std::fmt;
use std::str::FromStr;

/// Segment separator
pub const DELIMITER: char = '#';

/// Identifies one variable on one GitLab server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableRef {
    /// GitLab base URL
    pub server_url: String,
    /// Numeric id or `group/project` path
    pub project_id: String,
    /// Variable key
    pub variable_name: String,
}

impl VariableRef {
    /// Create a reference
    #[must_use]
    pub fn new(
        server_url: impl Into<String>,
        project_id: impl Into<String>,
        variable_name: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            project_id: project_id.into(),
            variable_name: variable_name.into(),
        }
    }

    /// Render as a physical resource identifier
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}{DELIMITER}{}{DELIMITER}{}",
            self.server_url, self.project_id, self.variable_name
        )
    }

    /// Parse a physical resource identifier.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::MalformedPhysicalId`] unless the input splits
    /// into exactly three non-empty segments.
    pub fn decode(physical_id: &str) -> Result<Self> {
        let segments: Vec<&str> = physical_id.split(DELIMITER).collect();
        match segments.as_slice() {
            [server, project, variable]
                if !server.is_empty() && !project.is_empty() && !variable.is_empty() =>
            {
                Ok(Self::new(*server, *project, *variable))
            }
            _ => Err(HandlerError::MalformedPhysicalId {
                physical_id: physical_id.to_string(),
            }),
        }
    }
}

impl fmt::Display for VariableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for VariableRef {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}
