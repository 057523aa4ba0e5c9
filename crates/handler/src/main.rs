//! Lambda `bootstrap` for the GitLab variable custom resource

use glvar_aws::AwsSecretStore;
use glvar_gitlab::HttpConnector;
use glvar_handler::{HandlerConfig, HandlerState, Reconciler, ResponseSender, logging};
use glvar_secrets::SecretResolver;
use lambda_runtime::{LambdaEvent, service_fn};
use miette::IntoDiagnostic;
use std::sync::Arc;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let config = HandlerConfig::from_env().into_diagnostic()?;
    logging::init_tracing(config.log_format, config.log_filter.as_deref())?;

    let store = AwsSecretStore::from_env().await;
    let reconciler = Reconciler::new(
        SecretResolver::new(Arc::new(store)),
        Arc::new(HttpConnector::new(config.user_agent.clone())),
    );
    let state = Arc::new(HandlerState::new(
        reconciler,
        ResponseSender::new(&config.user_agent)?,
    ));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<serde_json::Value>| {
        let state = Arc::clone(&state);
        async move { handle(&state, event).await }
    }))
    .await
    .map_err(|e| miette::miette!("Lambda runtime failed: {e}"))
}

async fn handle(
    state: &HandlerState,
    event: LambdaEvent<serde_json::Value>,
) -> Result<serde_json::Value, lambda_runtime::Error> {
    let (payload, context) = event.into_parts();
    Ok(state.handle_invocation(payload, &context.request_id).await?)
}
