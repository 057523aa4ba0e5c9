//! The `Custom::GitlabVariable` construct

use crate::error::{ConstructError, Result};
use crate::secret::{SecretRef, read_statement};
use crate::stack::{Resource, Stack, get_att, reference, validate_logical_id};
use serde_json::{Map, Value, json};
use tracing::debug;

/// Resource type of every variable instance
pub const RESOURCE_TYPE: &str = "Custom::GitlabVariable";

/// Logical id of the shared handler function
pub const FUNCTION_ID: &str = "SingletonLambdaGitlabVariableCustomResourceFunction";

/// Logical id of the handler's execution role
pub const ROLE_ID: &str = "SingletonLambdaGitlabVariableCustomResourceFunctionServiceRole";

/// Logical id of the handler role's inline policy
pub const POLICY_ID: &str =
    "SingletonLambdaGitlabVariableCustomResourceFunctionServiceRoleDefaultPolicy";

/// Parameter naming the S3 bucket holding the handler bundle
pub const CODE_BUCKET_PARAMETER: &str = "GitlabVariableHandlerCodeBucket";

/// Parameter naming the S3 key of the handler bundle
pub const CODE_KEY_PARAMETER: &str = "GitlabVariableHandlerCodeKey";

/// Ids the shared handler claims on first use
const HANDLER_IDS: [&str; 5] = [
    CODE_BUCKET_PARAMETER,
    CODE_KEY_PARAMETER,
    ROLE_ID,
    POLICY_ID,
    FUNCTION_ID,
];

const HANDLER_RUNTIME: &str = "provided.al2023";
const HANDLER_ENTRYPOINT: &str = "bootstrap";
const HANDLER_TIMEOUT_SECS: u32 = 30;
const BASIC_EXECUTION_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

/// Properties of one GitLab variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitlabVariableProps {
    /// Secret holding the value
    pub secret: SecretRef,
    /// JSON field to publish instead of the whole secret string
    pub secret_field: Option<String>,
    /// Numeric id or `group/project` path
    pub project_id: String,
    /// Variable key
    pub variable_name: String,
    /// GitLab instance; the handler defaults to gitlab.com
    pub server_url: Option<String>,
    /// Secret holding the GitLab access token
    pub gitlab_secret: SecretRef,
}

impl GitlabVariableProps {
    fn validate(&self, id: &str) -> Result<()> {
        let invalid = |reason: String| ConstructError::InvalidProps {
            id: id.to_string(),
            reason,
        };

        for (name, value) in [
            ("projectId", Some(self.project_id.as_str())),
            ("variableName", Some(self.variable_name.as_str())),
            ("serverUrl", self.server_url.as_deref()),
        ] {
            let Some(value) = value else { continue };
            if value.is_empty() {
                return Err(invalid(format!("{name} must not be empty")));
            }
            if value.contains('#') {
                return Err(invalid(format!("{name} must not contain '#'")));
            }
        }
        Ok(())
    }

    fn resource_properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert("ServiceToken".into(), get_att(FUNCTION_ID, "Arn"));
        properties.insert("SecretArn".into(), self.secret.arn());
        if let Some(field) = self.secret_field.as_deref().filter(|f| !f.is_empty()) {
            properties.insert("SecretField".into(), json!(field));
        }
        properties.insert("ProjectId".into(), json!(self.project_id));
        properties.insert("VariableName".into(), json!(self.variable_name));
        if let Some(url) = &self.server_url {
            properties.insert("ServerUrl".into(), json!(url));
        }
        properties.insert("GitlabSecretArn".into(), self.gitlab_secret.arn());
        properties
    }
}

/// A GitLab project variable kept in sync with a Secrets Manager secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitlabVariable {
    logical_id: String,
}

impl GitlabVariable {
    /// Register a variable in `stack`, provisioning the shared handler on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::InvalidProps`] for unusable properties and
    /// [`ConstructError::DuplicateId`] / [`ConstructError::InvalidId`] for bad
    /// logical ids.
    pub fn new(stack: &mut Stack, id: &str, props: GitlabVariableProps) -> Result<Self> {
        props.validate(id)?;
        validate_logical_id(id)?;
        if stack.contains_logical_id(id) || HANDLER_IDS.contains(&id) {
            return Err(ConstructError::DuplicateId {
                id: id.to_string(),
                stack: stack.name().to_string(),
            });
        }

        ensure_handler(stack)?;
        grant_read(stack, &props.secret);
        grant_read(stack, &props.gitlab_secret);

        let mut resource = Resource::new(RESOURCE_TYPE, Value::Null).depends_on(POLICY_ID);
        resource.properties = props.resource_properties();
        stack.add_resource(id, resource)?;

        debug!(id, project_id = %props.project_id, variable = %props.variable_name, "Added GitLab variable");
        Ok(Self {
            logical_id: id.to_string(),
        })
    }

    /// Logical id of the custom resource
    #[must_use]
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `Ref` of the custom resource: the handler's physical id
    /// (`server#project#variable`)
    #[must_use]
    pub fn physical_id(&self) -> Value {
        reference(&self.logical_id)
    }
}

/// Add the shared handler resources unless the stack already has them.
fn ensure_handler(stack: &mut Stack) -> Result<()> {
    if stack.try_find_child(FUNCTION_ID).is_some() {
        return Ok(());
    }
    if let Some(taken) = HANDLER_IDS.iter().find(|id| stack.contains_logical_id(id)) {
        return Err(ConstructError::DuplicateId {
            id: (*taken).to_string(),
            stack: stack.name().to_string(),
        });
    }
    debug!(stack = stack.name(), "Provisioning GitLab variable handler");

    stack.add_parameter(CODE_BUCKET_PARAMETER, "S3 bucket of the handler bundle")?;
    stack.add_parameter(CODE_KEY_PARAMETER, "S3 key of the handler bundle")?;

    stack.add_resource(
        ROLE_ID,
        Resource::new(
            "AWS::IAM::Role",
            json!({
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": "sts:AssumeRole",
                        "Effect": "Allow",
                        "Principal": {"Service": "lambda.amazonaws.com"}
                    }]
                },
                "ManagedPolicyArns": [BASIC_EXECUTION_POLICY]
            }),
        ),
    )?;

    stack.add_resource(
        POLICY_ID,
        Resource::new(
            "AWS::IAM::Policy",
            json!({
                "PolicyName": POLICY_ID,
                "PolicyDocument": {"Version": "2012-10-17", "Statement": []},
                "Roles": [reference(ROLE_ID)]
            }),
        ),
    )?;

    stack.add_resource(
        FUNCTION_ID,
        Resource::new(
            "AWS::Lambda::Function",
            json!({
                "Code": {
                    "S3Bucket": reference(CODE_BUCKET_PARAMETER),
                    "S3Key": reference(CODE_KEY_PARAMETER)
                },
                "Role": get_att(ROLE_ID, "Arn"),
                "Handler": HANDLER_ENTRYPOINT,
                "Runtime": HANDLER_RUNTIME,
                "Timeout": HANDLER_TIMEOUT_SECS
            }),
        )
        .depends_on(POLICY_ID)
        .depends_on(ROLE_ID),
    )
}

/// Append a read statement for `secret` to the handler policy.
fn grant_read(stack: &mut Stack, secret: &SecretRef) {
    let statement = read_statement(secret);
    let Some(statements) = stack
        .resource_mut(POLICY_ID)
        .and_then(|policy| policy.properties.get_mut("PolicyDocument"))
        .and_then(|document| document.get_mut("Statement"))
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    if !statements.contains(&statement) {
        statements.push(statement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> GitlabVariableProps {
        GitlabVariableProps {
            secret: SecretRef::from_arn("arn:db"),
            secret_field: Some("password".to_string()),
            project_id: "group/project".to_string(),
            variable_name: "RDS_PASSWORD".to_string(),
            server_url: None,
            gitlab_secret: SecretRef::from_arn("arn:token"),
        }
    }

    #[test]
    fn test_resource_properties_use_handler_names() {
        let properties = props().resource_properties();
        assert_eq!(properties["SecretArn"], "arn:db");
        assert_eq!(properties["SecretField"], "password");
        assert_eq!(properties["ProjectId"], "group/project");
        assert_eq!(properties["VariableName"], "RDS_PASSWORD");
        assert_eq!(properties["GitlabSecretArn"], "arn:token");
        assert!(!properties.contains_key("ServerUrl"));
    }

    #[test]
    fn test_empty_secret_field_is_omitted() {
        let mut props = props();
        props.secret_field = Some(String::new());
        assert!(!props.resource_properties().contains_key("SecretField"));
    }

    #[test]
    fn test_validate_rejects_delimiter() {
        let mut props = props();
        props.variable_name = "A#B".to_string();
        assert!(matches!(
            props.validate("V"),
            Err(ConstructError::InvalidProps { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_server_url() {
        let mut props = props();
        props.server_url = Some(String::new());
        assert!(props.validate("V").is_err());
    }

    #[test]
    fn test_invalid_id_leaves_stack_untouched() {
        let mut stack = Stack::new("s");
        let err = GitlabVariable::new(&mut stack, "bad-id", props()).unwrap_err();
        assert!(matches!(err, ConstructError::InvalidId { .. }));
        assert!(stack.resources().is_empty());
        assert!(!stack.has_parameter(CODE_BUCKET_PARAMETER));
    }

    #[test]
    fn test_handler_ids_are_reserved() {
        for id in HANDLER_IDS {
            let mut stack = Stack::new("s");
            let err = GitlabVariable::new(&mut stack, id, props()).unwrap_err();
            assert!(matches!(err, ConstructError::DuplicateId { .. }), "{id}");
            assert!(stack.resources().is_empty(), "{id}");
        }
    }

    #[test]
    fn test_handler_id_taken_by_other_resource() {
        let mut stack = Stack::new("s");
        stack
            .add_resource(ROLE_ID, Resource::new("AWS::IAM::Role", json!({})))
            .unwrap();

        let err = GitlabVariable::new(&mut stack, "Variable", props()).unwrap_err();
        assert!(matches!(err, ConstructError::DuplicateId { ref id, .. } if id == ROLE_ID));
        assert_eq!(stack.resources().len(), 1);
        assert!(!stack.has_parameter(CODE_BUCKET_PARAMETER));
    }

    #[test]
    fn test_grant_read_deduplicates() {
        let mut stack = Stack::new("s");
        ensure_handler(&mut stack).unwrap();
        grant_read(&mut stack, &SecretRef::from_arn("arn:a"));
        grant_read(&mut stack, &SecretRef::from_arn("arn:a"));
        grant_read(&mut stack, &SecretRef::from_arn("arn:b"));

        let policy = stack.try_find_child(POLICY_ID).unwrap();
        let statements = policy.properties["PolicyDocument"]["Statement"]
            .as_array()
            .unwrap();
        assert_eq!(statements.len(), 2);
    }
}
