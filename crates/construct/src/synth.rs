//! YAML stack definitions
//!
//! ```yaml
//! stackName: secrets-stack
//! variables:
//!   - id: RdsPassword
//!     secretArn: arn:aws:secretsmanager:eu-central-1:123456789012:secret:db
//!     secretField: password
//!     projectId: group/secrets-test
//!     variableName: RDS_PASSWORD
//!     gitlabSecretArn: arn:aws:secretsmanager:eu-central-1:123456789012:secret:GitlabToken
//! ```

use crate::error::{ConstructError, Result};
use crate::gitlab_variable::{GitlabVariable, GitlabVariableProps};
use crate::secret::SecretRef;
use crate::stack::Stack;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// A stack of GitLab variables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StackDefinition {
    /// Stack name
    pub stack_name: String,
    /// Template description
    #[serde(default)]
    pub description: Option<String>,
    /// Variables to publish
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
}

/// One variable entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VariableDefinition {
    /// Logical id of the custom resource
    pub id: String,
    /// ARN of the value secret
    pub secret_arn: String,
    /// JSON field inside the value secret
    #[serde(default)]
    pub secret_field: Option<String>,
    /// GitLab project id or path
    pub project_id: String,
    /// Variable key
    pub variable_name: String,
    /// GitLab instance URL
    #[serde(default)]
    pub server_url: Option<String>,
    /// ARN of the token secret
    pub gitlab_secret_arn: String,
}

impl From<&VariableDefinition> for GitlabVariableProps {
    fn from(def: &VariableDefinition) -> Self {
        Self {
            secret: SecretRef::from_arn(&def.secret_arn),
            secret_field: def.secret_field.clone(),
            project_id: def.project_id.clone(),
            variable_name: def.variable_name.clone(),
            server_url: def.server_url.clone(),
            gitlab_secret: SecretRef::from_arn(&def.gitlab_secret_arn),
        }
    }
}

impl StackDefinition {
    /// Parse a definition from YAML text
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::Definition`] on malformed input.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a definition file
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::Io`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConstructError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Build the stack: one variable construct and one physical id output
    /// per entry.
    ///
    /// # Errors
    ///
    /// Propagates construct errors such as duplicate ids.
    pub fn synthesize(&self) -> Result<Stack> {
        let mut stack = Stack::new(&self.stack_name);
        if let Some(description) = &self.description {
            stack = stack.with_description(description);
        }

        for def in &self.variables {
            let variable = GitlabVariable::new(&mut stack, &def.id, def.into())?;
            stack.add_output(
                &format!("{}PhysicalId", def.id),
                variable.physical_id(),
                &format!("GitLab variable {} of {}", def.variable_name, def.project_id),
            )?;
        }

        info!(
            stack = %self.stack_name,
            variables = self.variables.len(),
            "Synthesized stack"
        );
        Ok(stack)
    }
}
