//! Secrets Manager secrets referenced by constructs

use crate::error::Result;
use crate::stack::{Resource, Stack, reference};
use serde::Serialize;
use serde_json::{Value, json};

/// A secret the handler must be able to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretRef {
    /// Existing secret outside the stack
    Arn(String),
    /// `AWS::SecretsManager::Secret` in the same stack; `Ref` yields its ARN
    LogicalId(String),
}

impl SecretRef {
    /// Reference an existing secret by ARN
    #[must_use]
    pub fn from_arn(arn: impl Into<String>) -> Self {
        Self::Arn(arn.into())
    }

    /// Reference a secret resource of the same stack
    #[must_use]
    pub fn from_logical_id(logical_id: impl Into<String>) -> Self {
        Self::LogicalId(logical_id.into())
    }

    /// Template expression for the secret ARN
    #[must_use]
    pub fn arn(&self) -> Value {
        match self {
            Self::Arn(arn) => Value::String(arn.clone()),
            Self::LogicalId(id) => reference(id),
        }
    }

    /// Add an `AWS::SecretsManager::Secret` to `stack` and reference it.
    ///
    /// # Errors
    ///
    /// Fails if the id is invalid or taken.
    pub fn create(stack: &mut Stack, logical_id: &str, props: &SecretProps) -> Result<Self> {
        let properties = serde_json::to_value(props)?;
        stack.add_resource(
            logical_id,
            Resource::new("AWS::SecretsManager::Secret", properties),
        )?;
        Ok(Self::from_logical_id(logical_id))
    }
}

/// Properties of a secret created in the stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretProps {
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Generate the value at deploy time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_secret_string: Option<GenerateSecretString>,
}

/// Generated JSON secret: `template` plus one random key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenerateSecretString {
    /// JSON object the generated key is added to
    pub secret_string_template: String,
    /// Key receiving the random password
    pub generate_string_key: String,
    /// Length of the random password
    pub password_length: u32,
}

impl GenerateSecretString {
    /// Generate `key` inside `template`
    #[must_use]
    pub fn new(template: impl Into<String>, key: impl Into<String>, length: u32) -> Self {
        Self {
            secret_string_template: template.into(),
            generate_string_key: key.into(),
            password_length: length,
        }
    }
}

/// IAM statement granting read access to `secret`
#[must_use]
pub fn read_statement(secret: &SecretRef) -> Value {
    json!({
        "Action": ["secretsmanager:GetSecretValue", "secretsmanager:DescribeSecret"],
        "Effect": "Allow",
        "Resource": secret.arn()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arn_expression() {
        assert_eq!(
            SecretRef::from_arn("arn:aws:secretsmanager:eu-central-1:1:secret:x").arn(),
            json!("arn:aws:secretsmanager:eu-central-1:1:secret:x")
        );
        assert_eq!(SecretRef::from_logical_id("Db").arn(), json!({"Ref": "Db"}));
    }

    #[test]
    fn test_create_generated_secret() {
        let mut stack = Stack::new("s");
        let secret = SecretRef::create(
            &mut stack,
            "DBSecret",
            &SecretProps {
                description: Some("Some Secret".to_string()),
                generate_secret_string: Some(GenerateSecretString::new(
                    r#"{"username":"admin2"}"#,
                    "password",
                    20,
                )),
            },
        )
        .unwrap();

        assert_eq!(secret, SecretRef::LogicalId("DBSecret".to_string()));
        let resource = stack.try_find_child("DBSecret").unwrap();
        assert_eq!(resource.resource_type, "AWS::SecretsManager::Secret");
        assert_eq!(
            resource.properties["GenerateSecretString"]["GenerateStringKey"],
            "password"
        );
        assert_eq!(resource.properties["GenerateSecretString"]["PasswordLength"], 20);
    }

    #[test]
    fn test_read_statement() {
        let statement = read_statement(&SecretRef::from_logical_id("Db"));
        assert_eq!(statement["Resource"], json!({"Ref": "Db"}));
        assert_eq!(statement["Effect"], "Allow");
    }
}
