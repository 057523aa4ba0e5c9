//! Typed resource properties
//!
//! CloudFormation hands the handler an arbitrary JSON object. It is validated
//! here, once, before any flow runs.

use crate::error::{HandlerError, Result};
use crate::physical_id::{DELIMITER, VariableRef};
use glvar_gitlab::DEFAULT_SERVER_URL;
use serde::{Deserialize, Deserializer, Serialize};

/// Properties of a `Custom::GitlabVariable` resource.
///
/// Wire names are PascalCase (`SecretArn`, `GitlabSecretArn`, ...). The
/// framework-injected `ServiceToken` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariableProperties {
    /// Secret holding the value to publish
    pub secret_arn: String,

    /// JSON field of the secret to publish; the whole payload when absent
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub secret_field: Option<String>,

    /// Numeric id or `group/project` path
    pub project_id: String,

    /// Variable key
    pub variable_name: String,

    /// GitLab base URL, defaults to [`DEFAULT_SERVER_URL`]
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Secret holding the GitLab access token
    pub gitlab_secret_arn: String,
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

impl VariableProperties {
    /// Parse and validate the `ResourceProperties` object of an event.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::InvalidProperties`] when properties are absent,
    /// not an object, lack a required field, or would not survive the
    /// physical identifier round-trip.
    pub fn from_value(value: Option<&serde_json::Value>) -> Result<Self> {
        let value = value.ok_or_else(|| HandlerError::invalid_properties("missing ResourceProperties"))?;
        let properties: Self = serde_json::from_value(value.clone())
            .map_err(|e| HandlerError::invalid_properties(e.to_string()))?;
        properties.validate()?;
        Ok(properties)
    }

    /// Check required fields and delimiter-free identity fields.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::InvalidProperties`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("SecretArn", &self.secret_arn),
            ("ProjectId", &self.project_id),
            ("VariableName", &self.variable_name),
            ("GitlabSecretArn", &self.gitlab_secret_arn),
        ] {
            if value.trim().is_empty() {
                return Err(HandlerError::invalid_properties(format!("{name} must not be empty")));
            }
        }

        for (name, value) in [
            ("ServerUrl", self.server_url()),
            ("ProjectId", self.project_id.as_str()),
            ("VariableName", self.variable_name.as_str()),
        ] {
            if value.contains(DELIMITER) {
                return Err(HandlerError::invalid_properties(format!(
                    "{name} must not contain '{DELIMITER}'"
                )));
            }
        }

        Ok(())
    }

    /// Server URL with the default applied
    #[must_use]
    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Variable identity these properties describe
    #[must_use]
    pub fn variable_ref(&self) -> VariableRef {
        VariableRef::new(self.server_url(), &self.project_id, &self.variable_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> serde_json::Value {
        json!({
            "ServiceToken": "arn:aws:lambda:eu-central-1:123456789012:function:handler",
            "SecretArn": "arn:aws:secretsmanager:eu-central-1:123456789012:secret:db",
            "ProjectId": "group/secrets-test",
            "VariableName": "RDS_PASSWORD",
            "GitlabSecretArn": "arn:aws:secretsmanager:eu-central-1:123456789012:secret:GitlabToken"
        })
    }

    #[test]
    fn test_parse_minimal_properties() {
        let properties = VariableProperties::from_value(Some(&base())).unwrap();
        assert_eq!(properties.project_id, "group/secrets-test");
        assert_eq!(properties.variable_name, "RDS_PASSWORD");
        assert_eq!(properties.secret_field, None);
        assert_eq!(properties.server_url(), "https://gitlab.com");
    }

    #[test]
    fn test_parse_optional_fields() {
        let mut value = base();
        value["SecretField"] = json!("password");
        value["ServerUrl"] = json!("https://gitlab.example.com");
        let properties = VariableProperties::from_value(Some(&value)).unwrap();
        assert_eq!(properties.secret_field.as_deref(), Some("password"));
        assert_eq!(properties.server_url(), "https://gitlab.example.com");
    }

    #[test]
    fn test_empty_optional_fields_are_absent() {
        let mut value = base();
        value["SecretField"] = json!("");
        value["ServerUrl"] = json!("");
        let properties = VariableProperties::from_value(Some(&value)).unwrap();
        assert_eq!(properties.secret_field, None);
        assert_eq!(properties.server_url(), DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_missing_required_field() {
        let mut value = base();
        value.as_object_mut().unwrap().remove("GitlabSecretArn");
        let err = VariableProperties::from_value(Some(&value)).unwrap_err();
        assert!(err.to_string().contains("GitlabSecretArn"));
    }

    #[test]
    fn test_empty_required_field() {
        let mut value = base();
        value["ProjectId"] = json!("");
        let err = VariableProperties::from_value(Some(&value)).unwrap_err();
        assert!(err.to_string().contains("ProjectId must not be empty"));
    }

    #[test]
    fn test_delimiter_in_identity_field() {
        let mut value = base();
        value["VariableName"] = json!("A#B");
        let err = VariableProperties::from_value(Some(&value)).unwrap_err();
        assert!(matches!(err, HandlerError::InvalidProperties { .. }));
    }

    #[test]
    fn test_missing_properties() {
        let err = VariableProperties::from_value(None).unwrap_err();
        assert!(err.to_string().contains("missing ResourceProperties"));
    }

    #[test]
    fn test_variable_ref() {
        let properties = VariableProperties::from_value(Some(&base())).unwrap();
        assert_eq!(
            properties.variable_ref().encode(),
            "https://gitlab.com#group/secrets-test#RDS_PASSWORD"
        );
    }

    #[test]
    fn test_serialize_skips_absent_optionals() {
        let properties = VariableProperties::from_value(Some(&base())).unwrap();
        let value = serde_json::to_value(&properties).unwrap();
        assert!(value.get("SecretField").is_none());
        assert!(value.get("ServerUrl").is_none());
        assert_eq!(value["GitlabSecretArn"], base()["GitlabSecretArn"]);
    }
}
