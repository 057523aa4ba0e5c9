//! In-memory CloudFormation template

use crate::error::{ConstructError, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Template format version emitted in every template
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// `{"Ref": id}`
#[must_use]
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{"Fn::GetAtt": [id, attribute]}`
#[must_use]
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// One entry of the `Resources` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    /// CloudFormation type, e.g. `AWS::Lambda::Function`
    #[serde(rename = "Type")]
    pub resource_type: String,
    /// Resource properties
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    /// Logical ids this resource waits for
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Resource {
    /// Create a resource of `resource_type` with `properties`.
    ///
    /// Non-object property values are ignored.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            resource_type: resource_type.into(),
            properties,
            depends_on: Vec::new(),
        }
    }

    /// Add a `DependsOn` entry
    #[must_use]
    pub fn depends_on(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on.push(logical_id.into());
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Template<'a> {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_section")]
    parameters: &'a BTreeMap<String, Value>,
    resources: &'a BTreeMap<String, Resource>,
    #[serde(skip_serializing_if = "is_empty_section")]
    outputs: &'a BTreeMap<String, Value>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_empty_section(section: &&BTreeMap<String, Value>) -> bool {
    section.is_empty()
}

/// A stack under construction.
///
/// Logical ids are the keys of the `Parameters`, `Resources` and `Outputs`
/// sections; output order is sorted for stable diffs.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    name: String,
    description: Option<String>,
    parameters: BTreeMap<String, Value>,
    resources: BTreeMap<String, Resource>,
    outputs: BTreeMap<String, Value>,
}

impl Stack {
    /// Create an empty stack
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the template description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Stack name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a resource by logical id
    #[must_use]
    pub fn try_find_child(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    /// Mutable lookup of a resource by logical id
    pub fn resource_mut(&mut self, logical_id: &str) -> Option<&mut Resource> {
        self.resources.get_mut(logical_id)
    }

    /// All resources
    #[must_use]
    pub fn resources(&self) -> &BTreeMap<String, Resource> {
        &self.resources
    }

    /// Resources of one type
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
    }

    /// Add a resource.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::InvalidId`] for non-alphanumeric ids and
    /// [`ConstructError::DuplicateId`] if the id is taken.
    pub fn add_resource(&mut self, logical_id: &str, resource: Resource) -> Result<()> {
        validate_logical_id(logical_id)?;
        if self.contains_logical_id(logical_id) {
            return Err(ConstructError::DuplicateId {
                id: logical_id.to_string(),
                stack: self.name.clone(),
            });
        }
        self.resources.insert(logical_id.to_string(), resource);
        Ok(())
    }

    /// Add a `String` parameter
    ///
    /// # Errors
    ///
    /// Same as [`Stack::add_resource`].
    pub fn add_parameter(&mut self, logical_id: &str, description: &str) -> Result<()> {
        validate_logical_id(logical_id)?;
        if self.contains_logical_id(logical_id) {
            return Err(ConstructError::DuplicateId {
                id: logical_id.to_string(),
                stack: self.name.clone(),
            });
        }
        self.parameters.insert(
            logical_id.to_string(),
            json!({ "Type": "String", "Description": description }),
        );
        Ok(())
    }

    /// Add an output
    ///
    /// # Errors
    ///
    /// Same as [`Stack::add_resource`].
    pub fn add_output(&mut self, logical_id: &str, value: Value, description: &str) -> Result<()> {
        validate_logical_id(logical_id)?;
        if self.outputs.contains_key(logical_id) {
            return Err(ConstructError::DuplicateId {
                id: logical_id.to_string(),
                stack: self.name.clone(),
            });
        }
        self.outputs.insert(
            logical_id.to_string(),
            json!({ "Value": value, "Description": description }),
        );
        Ok(())
    }

    /// Whether a parameter or resource already uses `logical_id`.
    ///
    /// Parameters and resources share one namespace in a template.
    #[must_use]
    pub fn contains_logical_id(&self, logical_id: &str) -> bool {
        self.parameters.contains_key(logical_id) || self.resources.contains_key(logical_id)
    }

    /// Whether a parameter exists
    #[must_use]
    pub fn has_parameter(&self, logical_id: &str) -> bool {
        self.parameters.contains_key(logical_id)
    }

    /// Render the template as JSON
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::Render`] if serialization fails.
    pub fn to_template(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.template())?)
    }

    /// Render the template as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::Render`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.template())?)
    }

    fn template(&self) -> Template<'_> {
        Template {
            format_version: TEMPLATE_FORMAT_VERSION,
            description: self.description.as_deref(),
            parameters: &self.parameters,
            resources: &self.resources,
            outputs: &self.outputs,
        }
    }
}

/// Logical ids are non-empty ASCII alphanumerics.
///
/// # Errors
///
/// Returns [`ConstructError::InvalidId`] otherwise.
pub fn validate_logical_id(logical_id: &str) -> Result<()> {
    if logical_id.is_empty() || !logical_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConstructError::InvalidId {
            id: logical_id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack_template() {
        let stack = Stack::new("empty");
        let template = stack.to_template().unwrap();
        assert_eq!(
            template,
            json!({"AWSTemplateFormatVersion": "2010-09-09", "Resources": {}})
        );
    }

    #[test]
    fn test_add_and_find_resource() {
        let mut stack = Stack::new("s").with_description("test stack");
        stack
            .add_resource(
                "Topic",
                Resource::new("AWS::SNS::Topic", json!({"TopicName": "t"})).depends_on("Other"),
            )
            .unwrap();

        let resource = stack.try_find_child("Topic").unwrap();
        assert_eq!(resource.resource_type, "AWS::SNS::Topic");

        let template = stack.to_template().unwrap();
        assert_eq!(template["Description"], "test stack");
        assert_eq!(
            template["Resources"]["Topic"],
            json!({
                "Type": "AWS::SNS::Topic",
                "Properties": {"TopicName": "t"},
                "DependsOn": ["Other"]
            })
        );
    }

    #[test]
    fn test_duplicate_resource_id() {
        let mut stack = Stack::new("s");
        stack
            .add_resource("A", Resource::new("AWS::SNS::Topic", json!({})))
            .unwrap();
        let err = stack
            .add_resource("A", Resource::new("AWS::SNS::Topic", json!({})))
            .unwrap_err();
        assert!(matches!(err, ConstructError::DuplicateId { .. }));
    }

    #[test]
    fn test_parameter_and_resource_share_ids() {
        let mut stack = Stack::new("s");
        stack.add_parameter("CodeBucket", "bucket").unwrap();
        let err = stack
            .add_resource("CodeBucket", Resource::new("AWS::SNS::Topic", json!({})))
            .unwrap_err();
        assert!(matches!(err, ConstructError::DuplicateId { .. }));

        stack
            .add_resource("Topic", Resource::new("AWS::SNS::Topic", json!({})))
            .unwrap();
        let err = stack.add_parameter("Topic", "clash").unwrap_err();
        assert!(matches!(err, ConstructError::DuplicateId { .. }));
        assert!(!stack.has_parameter("Topic"));
    }

    #[test]
    fn test_invalid_logical_id() {
        let mut stack = Stack::new("s");
        for id in ["", "has-dash", "has space", "ünïcode"] {
            assert!(
                matches!(
                    stack.add_resource(id, Resource::new("AWS::SNS::Topic", json!({}))),
                    Err(ConstructError::InvalidId { .. })
                ),
                "{id:?}"
            );
        }
    }

    #[test]
    fn test_parameters_and_outputs() {
        let mut stack = Stack::new("s");
        stack.add_parameter("CodeBucket", "bucket").unwrap();
        stack
            .add_output("Out", reference("CodeBucket"), "echo")
            .unwrap();
        assert!(stack.has_parameter("CodeBucket"));

        let template = stack.to_template().unwrap();
        assert_eq!(template["Parameters"]["CodeBucket"]["Type"], "String");
        assert_eq!(template["Outputs"]["Out"]["Value"], json!({"Ref": "CodeBucket"}));
    }

    #[test]
    fn test_intrinsics() {
        assert_eq!(reference("X"), json!({"Ref": "X"}));
        assert_eq!(get_att("X", "Arn"), json!({"Fn::GetAtt": ["X", "Arn"]}));
    }
}
