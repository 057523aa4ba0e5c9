//! Direct CloudFormation responses
//!
//! When the custom resource's `ServiceToken` points straight at the handler,
//! CloudFormation waits for a response document on the pre-signed
//! `ResponseURL` instead of reading the function result.

use crate::error::{HandlerError, Result};
use crate::event::{CustomResourceEvent, RequestKind};
use crate::reconcile::ReconcileOutcome;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{debug, info};

/// Physical id prefix reported when Create fails in direct mode
pub const FAILED_CREATE_PREFIX: &str = "create-failed:";

/// CloudFormation truncates longer reasons
const MAX_REASON_CHARS: usize = 1024;

/// Result status of a custom resource request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// The operation succeeded
    Success,
    /// The operation failed; `Reason` explains why
    Failed,
}

/// Response document PUT to the `ResponseURL`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloudFormationResponse {
    /// Outcome
    pub status: ResponseStatus,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Identifier CloudFormation keeps for the resource
    pub physical_resource_id: String,
    /// Echoed from the request
    pub stack_id: String,
    /// Echoed from the request
    pub request_id: String,
    /// Echoed from the request
    pub logical_resource_id: String,
    /// Attributes readable with `Fn::GetAtt`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CloudFormationResponse {
    /// Build the response for a finished invocation.
    ///
    /// `invocation_id` names the Lambda request in failure reasons.
    #[must_use]
    pub fn from_result(
        event: &CustomResourceEvent,
        result: &Result<ReconcileOutcome>,
        invocation_id: &str,
    ) -> Self {
        let request_id = event.request_id.clone().unwrap_or_default();
        let prior_id = event.physical_resource_id.clone();

        let (status, reason, physical_resource_id) = match result {
            Ok(outcome) => {
                let physical_id = outcome
                    .physical_id
                    .clone()
                    .or(prior_id)
                    .unwrap_or_else(|| request_id.clone());
                (ResponseStatus::Success, None, physical_id)
            }
            Err(err) => {
                let reason: String = format!("{err} (invocation {invocation_id})")
                    .chars()
                    .take(MAX_REASON_CHARS)
                    .collect();
                let physical_id =
                    prior_id.unwrap_or_else(|| format!("{FAILED_CREATE_PREFIX}{request_id}"));
                (ResponseStatus::Failed, Some(reason), physical_id)
            }
        };

        Self {
            status,
            reason,
            data: None,
            physical_resource_id,
            stack_id: event.stack_id.clone().unwrap_or_default(),
            request_id,
            logical_resource_id: event.logical_resource_id.clone().unwrap_or_default(),
        }
    }
}

/// Whether a Delete targets a resource whose Create failed in direct mode.
///
/// Such a resource never reached GitLab, so there is nothing to remove.
#[must_use]
pub fn is_failed_create_cleanup(event: &CustomResourceEvent) -> bool {
    event.request_type == RequestKind::Delete.as_str()
        && event
            .physical_resource_id
            .as_deref()
            .is_some_and(|id| id.starts_with(FAILED_CREATE_PREFIX))
}

/// Delivers response documents to pre-signed URLs.
#[derive(Debug, Clone)]
pub struct ResponseSender {
    client: Client,
}

impl ResponseSender {
    /// Create a sender
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::ResponseFailed`] if the HTTP client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| HandlerError::ResponseFailed {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// PUT `response` to `url`.
    ///
    /// The pre-signed S3 URL is signed for an empty content type.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::ResponseFailed`] on transport errors and
    /// non-success statuses.
    pub async fn send(&self, url: &str, response: &CloudFormationResponse) -> Result<()> {
        let body = serde_json::to_string(response).map_err(|e| HandlerError::ResponseFailed {
            message: e.to_string(),
        })?;
        debug!(
            status = ?response.status,
            physical_resource_id = %response.physical_resource_id,
            "Sending CloudFormation response"
        );

        let reply = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .map_err(|e| HandlerError::ResponseFailed {
                message: e.to_string(),
            })?;

        if !reply.status().is_success() {
            return Err(HandlerError::ResponseFailed {
                message: format!("response URL returned {}", reply.status()),
            });
        }

        info!(status = ?response.status, "CloudFormation response delivered");
        Ok(())
    }
}
