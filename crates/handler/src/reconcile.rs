//! Reconciliation of a GitLab variable against a lifecycle event
//!
//! Each flow resolves its secrets first and then makes exactly one GitLab
//! call. Nothing is retried and nothing is rolled back on failure.

use crate::error::Result;
use crate::event::{CustomResourceEvent, LifecycleEvent};
use crate::physical_id::VariableRef;
use crate::properties::VariableProperties;
use glvar_gitlab::{GitLabConnector, VariableOptions};
use glvar_secrets::{SecretResolver, SecureSecret};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

/// Outcome of a successful flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// New physical id (Create, or Update that changed identity)
    pub physical_id: Option<String>,
}

impl ReconcileOutcome {
    /// Outcome carrying a newly assigned identifier
    #[must_use]
    pub fn created(physical_id: impl Into<String>) -> Self {
        Self {
            physical_id: Some(physical_id.into()),
        }
    }

    /// Outcome that keeps the current identifier
    #[must_use]
    pub const fn unchanged() -> Self {
        Self { physical_id: None }
    }

    /// Provider framework response: `{"PhysicalResourceId": ...}` or `{}`
    #[must_use]
    pub fn to_response(&self) -> serde_json::Value {
        match &self.physical_id {
            Some(id) => json!({ "PhysicalResourceId": id }),
            None => json!({}),
        }
    }
}

/// Runs the Create, Update and Delete flows.
///
/// Holds no state between invocations; GitLab clients are built per call from
/// the connector.
#[derive(Clone)]
pub struct Reconciler {
    secrets: SecretResolver,
    connector: Arc<dyn GitLabConnector>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("secrets", &self.secrets)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Create a reconciler
    #[must_use]
    pub fn new(secrets: SecretResolver, connector: Arc<dyn GitLabConnector>) -> Self {
        Self { secrets, connector }
    }

    /// Validate a raw event and run the matching flow.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::HandlerError::InvalidEventKind`] for unknown request
    /// types, with a validation error for bad properties or identifiers, and
    /// with any secret or GitLab error raised by the flow.
    pub async fn handle_event(&self, event: &CustomResourceEvent) -> Result<ReconcileOutcome> {
        let lifecycle = LifecycleEvent::try_from(event)?;
        self.reconcile(lifecycle).await
    }

    /// Run the flow for a validated event.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::handle_event`].
    pub async fn reconcile(&self, event: LifecycleEvent) -> Result<ReconcileOutcome> {
        match event {
            LifecycleEvent::Create { properties } => self.on_create(&properties).await,
            LifecycleEvent::Update {
                physical_id,
                properties,
            } => self.on_update(&physical_id, &properties).await,
            LifecycleEvent::Delete {
                physical_id,
                properties,
            } => self.on_delete(&physical_id, &properties).await,
        }
    }

    /// Create the variable and return its physical identifier.
    ///
    /// # Errors
    ///
    /// Secret and GitLab errors propagate unchanged.
    #[instrument(skip_all, fields(project_id = %properties.project_id, variable = %properties.variable_name))]
    pub async fn on_create(&self, properties: &VariableProperties) -> Result<ReconcileOutcome> {
        let target = properties.variable_ref();
        let token = self.access_token(properties).await?;
        let value = self.variable_value(properties).await?;

        let api = self.connector.connect(&target.server_url, &token)?;
        api.create_variable(
            &target.project_id,
            &target.variable_name,
            &value,
            VariableOptions::protected(),
        )
        .await?;

        let physical_id = target.encode();
        info!(%physical_id, "Variable created");
        Ok(ReconcileOutcome::created(physical_id))
    }

    /// Refresh the value in place, or create under the new identity.
    ///
    /// When server, project or variable name changed, the old variable is left
    /// alone: CloudFormation sees a new physical id and sends a Delete for the
    /// old one once the stack update completes.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::HandlerError::MalformedPhysicalId`] if the prior id
    /// cannot be decoded; secret and GitLab errors propagate unchanged.
    #[instrument(skip_all, fields(%physical_id))]
    pub async fn on_update(
        &self,
        physical_id: &str,
        properties: &VariableProperties,
    ) -> Result<ReconcileOutcome> {
        let current = VariableRef::decode(physical_id)?;
        let token = self.access_token(properties).await?;
        let desired = properties.variable_ref();

        if current != desired {
            info!(
                new_physical_id = %desired,
                "Variable identity changed, creating replacement"
            );
            return self.on_create(properties).await;
        }

        let value = self.variable_value(properties).await?;
        let api = self.connector.connect(&current.server_url, &token)?;
        api.edit_variable(
            &current.project_id,
            &current.variable_name,
            &value,
            VariableOptions::protected(),
        )
        .await?;

        info!("Variable value updated");
        Ok(ReconcileOutcome::unchanged())
    }

    /// Remove the variable identified by the prior physical identifier.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::HandlerError::MalformedPhysicalId`] if the prior id
    /// cannot be decoded. A variable that no longer exists upstream is an
    /// error like any other GitLab failure.
    #[instrument(skip_all, fields(%physical_id))]
    pub async fn on_delete(
        &self,
        physical_id: &str,
        properties: &VariableProperties,
    ) -> Result<ReconcileOutcome> {
        let current = VariableRef::decode(physical_id)?;
        let token = self.access_token(properties).await?;

        let api = self.connector.connect(&current.server_url, &token)?;
        api.delete_variable(&current.project_id, &current.variable_name)
            .await?;

        info!("Variable deleted");
        Ok(ReconcileOutcome::unchanged())
    }

    async fn access_token(&self, properties: &VariableProperties) -> Result<SecureSecret> {
        Ok(self
            .secrets
            .resolve(&properties.gitlab_secret_arn, None)
            .await?)
    }

    async fn variable_value(&self, properties: &VariableProperties) -> Result<SecureSecret> {
        Ok(self
            .secrets
            .resolve(&properties.secret_arn, properties.secret_field.as_deref())
            .await?)
    }
}
