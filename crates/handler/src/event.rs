//! CloudFormation custom resource events

use crate::error::{HandlerError, Result};
use crate::properties::VariableProperties;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw custom resource event as delivered by CloudFormation or the provider
/// framework.
///
/// Everything except `RequestType` is optional so that malformed events are
/// reported through [`LifecycleEvent::try_from`] rather than a generic
/// deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    /// `Create`, `Update` or `Delete`
    #[serde(default)]
    pub request_type: String,

    /// Current resource properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_properties: Option<serde_json::Value>,

    /// Previous resource properties (Update only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<serde_json::Value>,

    /// Identifier assigned on Create; absent on Create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,

    /// Unique id of this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Stack ARN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,

    /// Logical id of the resource in the template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_resource_id: Option<String>,

    /// Pre-signed URL for the response document (direct invocation only)
    #[serde(default, rename = "ResponseURL", skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,

    /// Resource type, e.g. `Custom::GitlabVariable`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// ARN of the function that receives the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
}

/// Lifecycle request kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Resource is being created
    Create,
    /// Resource properties changed
    Update,
    /// Resource is being removed
    Delete,
}

impl RequestKind {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Create" => Ok(Self::Create),
            "Update" => Ok(Self::Update),
            "Delete" => Ok(Self::Delete),
            other => Err(HandlerError::InvalidEventKind {
                request_type: other.to_string(),
            }),
        }
    }
}

/// A validated event, one variant per flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Publish a new variable
    Create {
        /// Desired properties
        properties: VariableProperties,
    },
    /// Refresh the value, or publish under a new identity
    Update {
        /// Identifier returned by the earlier Create
        physical_id: String,
        /// Desired properties
        properties: VariableProperties,
    },
    /// Remove the variable
    Delete {
        /// Identifier returned by the earlier Create
        physical_id: String,
        /// Properties of the resource being removed
        properties: VariableProperties,
    },
}

impl LifecycleEvent {
    /// Kind of this event
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::Create { .. } => RequestKind::Create,
            Self::Update { .. } => RequestKind::Update,
            Self::Delete { .. } => RequestKind::Delete,
        }
    }
}

impl TryFrom<&CustomResourceEvent> for LifecycleEvent {
    type Error = HandlerError;

    fn try_from(event: &CustomResourceEvent) -> Result<Self> {
        let kind: RequestKind = event.request_type.parse()?;

        let physical_id = || {
            event
                .physical_resource_id
                .clone()
                .ok_or_else(|| HandlerError::MissingPhysicalId {
                    request_type: kind.to_string(),
                })
        };

        Ok(match kind {
            RequestKind::Create => Self::Create {
                properties: VariableProperties::from_value(event.resource_properties.as_ref())?,
            },
            RequestKind::Update => Self::Update {
                physical_id: physical_id()?,
                properties: VariableProperties::from_value(event.resource_properties.as_ref())?,
            },
            RequestKind::Delete => Self::Delete {
                physical_id: physical_id()?,
                properties: VariableProperties::from_value(event.resource_properties.as_ref())?,
            },
        })
    }
}
