//! Invocation entry point shared by the Lambda binary and tests

use crate::error::{HandlerError, Result};
use crate::event::CustomResourceEvent;
use crate::reconcile::{ReconcileOutcome, Reconciler};
use crate::response::{CloudFormationResponse, ResponseSender, is_failed_create_cleanup};
use tracing::{error, info, info_span, Instrument};

/// Everything an invocation needs, built once per cold start.
#[derive(Debug, Clone)]
pub struct HandlerState {
    reconciler: Reconciler,
    responder: ResponseSender,
}

impl HandlerState {
    /// Create the state
    #[must_use]
    pub const fn new(reconciler: Reconciler, responder: ResponseSender) -> Self {
        Self {
            reconciler,
            responder,
        }
    }

    /// Handle one invocation payload.
    ///
    /// Events carrying a `ResponseURL` are answered directly and the
    /// invocation succeeds once the response is delivered. Other events are
    /// answered through the return value, as the provider framework expects.
    ///
    /// # Errors
    ///
    /// In framework mode any flow error is returned. In direct mode only a
    /// failure to deliver the response is returned.
    pub async fn handle_invocation(
        &self,
        payload: serde_json::Value,
        invocation_id: &str,
    ) -> Result<serde_json::Value> {
        let event: CustomResourceEvent =
            serde_json::from_value(payload).map_err(HandlerError::InvalidEvent)?;

        let span = info_span!(
            "custom_resource",
            request_type = %event.request_type,
            logical_resource_id = event.logical_resource_id.as_deref().unwrap_or_default(),
            physical_resource_id = event.physical_resource_id.as_deref().unwrap_or_default(),
            invocation_id,
        );

        async move {
            info!(
                resource_type = event.resource_type.as_deref().unwrap_or_default(),
                direct = event.response_url.is_some(),
                "Received custom resource event"
            );

            match event.response_url.as_deref() {
                Some(url) => self.respond_directly(&event, url, invocation_id).await,
                None => {
                    let outcome = self.reconciler.handle_event(&event).await.inspect_err(
                        |err| error!(error = %err, "Custom resource operation failed"),
                    )?;
                    Ok(outcome.to_response())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn respond_directly(
        &self,
        event: &CustomResourceEvent,
        url: &str,
        invocation_id: &str,
    ) -> Result<serde_json::Value> {
        let result = if is_failed_create_cleanup(event) {
            info!("Skipping delete of a resource that was never created");
            Ok(ReconcileOutcome::unchanged())
        } else {
            self.reconciler.handle_event(event).await
        };

        if let Err(err) = &result {
            error!(error = %err, "Custom resource operation failed");
        }

        let response = CloudFormationResponse::from_result(event, &result, invocation_id);
        self.responder.send(url, &response).await?;

        Ok(serde_json::to_value(&response).unwrap_or_default())
    }
}
