//! CloudFormation synthesis for GitLab variables
//!
//! [`GitlabVariable`] adds one `Custom::GitlabVariable` resource to a
//! [`Stack`], together with the handler function it needs. The handler is a
//! singleton: every variable in a stack shares one function, one role and one
//! policy, and each variable only adds read grants for its two secrets.
//!
//! ```ignore
//! let mut stack = Stack::new("secrets-stack");
//! GitlabVariable::new(&mut stack, "RdsPassword", GitlabVariableProps {
//!     secret: SecretRef::from_arn(db_secret_arn),
//!     secret_field: Some("password".into()),
//!     project_id: "group/secrets-test".into(),
//!     variable_name: "RDS_PASSWORD".into(),
//!     server_url: None,
//!     gitlab_secret: SecretRef::from_arn(token_arn),
//! })?;
//! println!("{}", stack.to_json_pretty()?);
//! ```

pub mod error;
pub mod gitlab_variable;
pub mod secret;
pub mod stack;
pub mod synth;

pub use error::{ConstructError, Result};
pub use gitlab_variable::{GitlabVariable, GitlabVariableProps};
pub use secret::{GenerateSecretString, SecretProps, SecretRef};
pub use stack::{Resource, Stack};
pub use synth::{StackDefinition, VariableDefinition};
