//! Single-value secret resolution with optional JSON field selection

use crate::{SecretError, SecretStore, SecureSecret};
use std::sync::Arc;

/// Resolves one string value from a [`SecretStore`].
///
/// Without a field name the raw payload is returned as-is. With a field name
/// the payload is parsed as a JSON object and the named field is returned.
/// Nothing is cached; every call goes to the store.
#[derive(Clone)]
pub struct SecretResolver {
    store: Arc<dyn SecretStore>,
}

impl std::fmt::Debug for SecretResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretResolver")
            .field("provider", &self.store.provider_name())
            .finish()
    }
}

impl SecretResolver {
    /// Create a resolver backed by the given store
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Resolve a secret, optionally selecting one field of a JSON payload.
    ///
    /// An empty field name is treated the same as no field name.
    ///
    /// # Errors
    ///
    /// - [`SecretError::NotFound`] when the store has no value, or an empty
    ///   one, for `secret_id`
    /// - [`SecretError::FieldMissing`] when `field` is not present in the payload
    /// - [`SecretError::MalformedPayload`] when `field` is given and the payload
    ///   is not valid JSON
    /// - any store error, unchanged
    pub async fn resolve(
        &self,
        secret_id: &str,
        field: Option<&str>,
    ) -> Result<SecureSecret, SecretError> {
        tracing::debug!(
            secret_id,
            field,
            provider = self.store.provider_name(),
            "Resolving secret"
        );

        let payload = self
            .store
            .get_secret(secret_id)
            .await?
            .filter(|payload| !payload.is_empty())
            .ok_or_else(|| SecretError::NotFound {
                secret_id: secret_id.to_string(),
            })?;

        match field.filter(|f| !f.is_empty()) {
            None => Ok(SecureSecret::new(payload)),
            Some(field) => extract_field(secret_id, &payload, field).map(SecureSecret::new),
        }
    }
}

/// Extract a specific key from a JSON secret payload
fn extract_field(secret_id: &str, payload: &str, field: &str) -> Result<String, SecretError> {
    let parsed: serde_json::Value =
        serde_json::from_str(payload).map_err(|source| SecretError::MalformedPayload {
            secret_id: secret_id.to_string(),
            source,
        })?;

    let value = parsed.get(field).ok_or_else(|| SecretError::FieldMissing {
        secret_id: secret_id.to_string(),
        field: field.to_string(),
    })?;

    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        other => Ok(other.to_string()),
    }
}
