//! AWS Secrets Manager secret store

use async_trait::async_trait;
use aws_sdk_secretsmanager::Client;
use glvar_secrets::{SecretError, SecretStore};

/// Reads secrets from AWS Secrets Manager with `GetSecretValue`.
///
/// Credentials and region come from the default provider chain, which inside
/// Lambda is the function's execution role.
#[derive(Clone)]
pub struct AwsSecretStore {
    client: Client,
}

impl std::fmt::Debug for AwsSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretStore").finish_non_exhaustive()
    }
}

impl AwsSecretStore {
    /// Create a store from the ambient AWS configuration
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::new(Client::new(&config))
    }

    /// Create a store around an existing client
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn get_secret(&self, secret_id: &str) -> Result<Option<String>, SecretError> {
        let response = match self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception())
                {
                    tracing::debug!(secret_id, "Secret does not exist");
                    return Ok(None);
                }
                return Err(SecretError::Store {
                    secret_id: secret_id.to_string(),
                    message: format!(
                        "AWS Secrets Manager error: {}",
                        aws_sdk_secretsmanager::error::DisplayErrorContext(&e)
                    ),
                });
            }
        };

        if response.secret_string().is_none() {
            tracing::warn!(secret_id, "Secret has no string value (may be binary)");
        }

        Ok(response.secret_string().map(str::to_string))
    }

    fn provider_name(&self) -> &'static str {
        "aws"
    }
}
