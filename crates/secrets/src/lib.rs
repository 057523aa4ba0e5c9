//! Secret Resolution for glvar
//!
//! Reads the GitLab access token and the value to publish from a secrets store.
//! The store itself sits behind the [`SecretStore`] trait so the reconciliation
//! handler can run against AWS Secrets Manager in production and an in-memory
//! store in tests.
//!
//! ```ignore
//! use glvar_secrets::SecretResolver;
//!
//! let resolver = SecretResolver::new(store);
//! let token = resolver.resolve(&gitlab_secret_arn, None).await?;
//! let password = resolver.resolve(&db_secret_arn, Some("password")).await?;
//! ```

mod resolver;
pub mod stores;
mod types;

pub use resolver::SecretResolver;
pub use stores::InMemorySecretStore;
pub use types::SecureSecret;

// Provider implementations are in separate crates:
// - glvar-aws: AwsSecretStore

use async_trait::async_trait;
use thiserror::Error;

/// Error types for secret resolution
#[derive(Debug, Error)]
pub enum SecretError {
    /// The store holds no string value for the identifier
    #[error("Error retrieving value from secret '{secret_id}': secret not found")]
    NotFound {
        /// Secret identifier (name or ARN)
        secret_id: String,
    },

    /// A field was requested but the structured payload does not contain it
    #[error("Error retrieving value from secret '{secret_id}': did not find field '{field}'")]
    FieldMissing {
        /// Secret identifier (name or ARN)
        secret_id: String,
        /// Requested field name
        field: String,
    },

    /// A field was requested but the payload is not a JSON object
    #[error("Secret '{secret_id}' is not valid JSON: {source}")]
    MalformedPayload {
        /// Secret identifier (name or ARN)
        secret_id: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// The store failed; the upstream message is passed through verbatim
    #[error("Failed to read secret '{secret_id}': {message}")]
    Store {
        /// Secret identifier (name or ARN)
        secret_id: String,
        /// Error message from the store
        message: String,
    },
}

/// Read-only access to a secrets store.
///
/// Implementors return `Ok(None)` when the store has no string value for the
/// identifier and reserve `Err` for upstream failures.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the raw payload of a secret by identifier.
    async fn get_secret(&self, secret_id: &str) -> Result<Option<String>, SecretError>;

    /// Get the provider name for this store.
    ///
    /// Examples: `"aws"`, `"memory"`
    fn provider_name(&self) -> &'static str;
}
