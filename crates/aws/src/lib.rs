//! AWS integration for glvar
//!
//! Provides the AWS Secrets Manager backed [`glvar_secrets::SecretStore`]
//! used by the Lambda handler via the [`secrets`] module.

pub mod secrets;

// Re-export main types for convenience
pub use secrets::AwsSecretStore;
