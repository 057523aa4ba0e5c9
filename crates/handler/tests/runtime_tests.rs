//! End-to-end invocation tests: real HTTP GitLab client and CloudFormation
//! responder against mock servers

use glvar_gitlab::HttpConnector;
use glvar_handler::{HandlerError, HandlerState, Reconciler, ResponseSender};
use glvar_secrets::{InMemorySecretStore, SecretResolver};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_ARN: &str = "arn:aws:secretsmanager:eu-central-1:123456789012:secret:GitlabToken";
const DB_ARN: &str = "arn:aws:secretsmanager:eu-central-1:123456789012:secret:db";

fn state() -> HandlerState {
    let store = InMemorySecretStore::new()
        .with_secret(TOKEN_ARN, "glpat-token")
        .with_secret(DB_ARN, r#"{"password":"hunter2"}"#);
    HandlerState::new(
        Reconciler::new(
            SecretResolver::new(Arc::new(store)),
            Arc::new(HttpConnector::new("glvar-tests")),
        ),
        ResponseSender::new("glvar-tests").unwrap(),
    )
}

fn event(request_type: &str, server_url: &str, physical_id: Option<String>) -> Value {
    let mut event = json!({
        "RequestType": request_type,
        "RequestId": "req-1",
        "StackId": "arn:aws:cloudformation:eu-central-1:123456789012:stack/s/1",
        "LogicalResourceId": "Variable",
        "ResourceType": "Custom::GitlabVariable",
        "ResourceProperties": {
            "ServiceToken": "arn:aws:lambda:eu-central-1:123456789012:function:handler",
            "SecretArn": DB_ARN,
            "SecretField": "password",
            "ProjectId": "g/p",
            "VariableName": "V",
            "ServerUrl": server_url,
            "GitlabSecretArn": TOKEN_ARN
        }
    });
    if let Some(id) = physical_id {
        event["PhysicalResourceId"] = json!(id);
    }
    event
}

fn variable_body() -> Value {
    json!({"key": "V", "value": "hunter2", "protected": true, "masked": false})
}

#[tokio::test]
async fn framework_mode_create_returns_physical_id() {
    let gitlab = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/g%2Fp/variables"))
        .and(header("authorization", "Bearer glpat-token"))
        .and(body_partial_json(json!({"key": "V", "value": "hunter2"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(variable_body()))
        .expect(1)
        .mount(&gitlab)
        .await;

    let result = state()
        .handle_invocation(event("Create", &gitlab.uri(), None), "inv-1")
        .await
        .unwrap();

    assert_eq!(
        result,
        json!({"PhysicalResourceId": format!("{}#g/p#V", gitlab.uri())})
    );
}

#[tokio::test]
async fn framework_mode_update_returns_empty_object() {
    let gitlab = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/g%2Fp/variables/V"))
        .respond_with(ResponseTemplate::new(200).set_body_json(variable_body()))
        .expect(1)
        .mount(&gitlab)
        .await;

    let prior = format!("{}#g/p#V", gitlab.uri());
    let result = state()
        .handle_invocation(event("Update", &gitlab.uri(), Some(prior)), "inv-1")
        .await
        .unwrap();

    assert_eq!(result, json!({}));
}

#[tokio::test]
async fn framework_mode_propagates_errors() {
    let gitlab = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/g%2Fp/variables/V"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&gitlab)
        .await;

    let prior = format!("{}#g/p#V", gitlab.uri());
    let err = state()
        .handle_invocation(event("Delete", &gitlab.uri(), Some(prior)), "inv-1")
        .await
        .unwrap_err();

    assert!(matches!(err, HandlerError::GitLab(_)));
}

#[tokio::test]
async fn non_object_payload_is_invalid_event() {
    let err = state()
        .handle_invocation(json!("not an event"), "inv-1")
        .await
        .unwrap_err();

    assert!(matches!(err, HandlerError::InvalidEvent(_)));
}

#[tokio::test]
async fn direct_mode_reports_success_to_response_url() {
    let gitlab = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/g%2Fp/variables/V"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&gitlab)
        .await;

    let cloudformation = MockServer::start().await;
    let prior = format!("{}#g/p#V", gitlab.uri());
    Mock::given(method("PUT"))
        .and(path("/response"))
        .and(body_partial_json(json!({
            "Status": "SUCCESS",
            "PhysicalResourceId": prior.clone(),
            "RequestId": "req-1",
            "LogicalResourceId": "Variable"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&cloudformation)
        .await;

    let mut payload = event("Delete", &gitlab.uri(), Some(prior));
    payload["ResponseURL"] = json!(format!("{}/response", cloudformation.uri()));

    let result = state().handle_invocation(payload, "inv-1").await.unwrap();

    assert_eq!(result["Status"], "SUCCESS");
}

#[tokio::test]
async fn direct_mode_reports_failure_without_failing_invocation() {
    let gitlab = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/g%2Fp/variables"))
        .respond_with(ResponseTemplate::new(403).set_body_string("403 Forbidden"))
        .mount(&gitlab)
        .await;

    let cloudformation = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/response"))
        .and(body_partial_json(json!({
            "Status": "FAILED",
            "PhysicalResourceId": "create-failed:req-1"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&cloudformation)
        .await;

    let mut payload = event("Create", &gitlab.uri(), None);
    payload["ResponseURL"] = json!(format!("{}/response", cloudformation.uri()));

    let result = state().handle_invocation(payload, "inv-7").await.unwrap();

    assert_eq!(result["Status"], "FAILED");
    let reason = result["Reason"].as_str().unwrap();
    assert!(reason.contains("403"));
    assert!(reason.contains("inv-7"));
}

#[tokio::test]
async fn direct_mode_skips_cleanup_of_failed_create() {
    let gitlab = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&gitlab)
        .await;

    let cloudformation = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/response"))
        .and(body_partial_json(json!({
            "Status": "SUCCESS",
            "PhysicalResourceId": "create-failed:req-0"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&cloudformation)
        .await;

    let mut payload = event(
        "Delete",
        &gitlab.uri(),
        Some("create-failed:req-0".to_string()),
    );
    payload["ResponseURL"] = json!(format!("{}/response", cloudformation.uri()));

    state().handle_invocation(payload, "inv-1").await.unwrap();
}

#[tokio::test]
async fn direct_mode_surfaces_undeliverable_response() {
    let cloudformation = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&cloudformation)
        .await;

    let mut payload = event("Rollback", "https://gitlab.com", None);
    payload["ResponseURL"] = json!(format!("{}/response", cloudformation.uri()));

    let err = state().handle_invocation(payload, "inv-1").await.unwrap_err();

    assert!(matches!(err, HandlerError::ResponseFailed { .. }));
}
