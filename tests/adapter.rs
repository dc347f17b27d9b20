//! Custom-resource envelopes through the adapter, including response delivery.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use identity_provisioner::adapter::server::build_router;
use identity_provisioner::adapter::{
    CustomResourceRequest, CustomResourceResponse, LifecycleAdapter, ResponseSender, ResponseStatus,
};
use identity_provisioner::controller::{is_placeholder, ResourceKind};
use identity_provisioner::remote::RetryPolicy;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{controller, default_resolver};

const STACK_ID: &str = "arn:aws:cloudformation:us-east-1:123456789012:stack/identity/1";

fn adapter(platform: &MockServer, default_kind: Option<ResourceKind>) -> LifecycleAdapter {
    let responder = ResponseSender::new(RetryPolicy::default().immediate(), Duration::from_secs(2)).unwrap();
    LifecycleAdapter::new(controller(platform, default_resolver()), default_kind).with_responder(responder)
}

fn envelope(request_type: &str, resource_type: &str, response_url: &str, properties: Value) -> Value {
    json!({
        "RequestType": request_type,
        "ResponseURL": response_url,
        "StackId": STACK_ID,
        "RequestId": "req-1",
        "ResourceType": resource_type,
        "LogicalResourceId": "AdminUser",
        "ResourceProperties": properties,
    })
}

fn parse(value: Value) -> CustomResourceRequest {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_create_reports_success_to_response_url() {
    let platform = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/mgmt/user/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"userId": "usr_77"}})))
        .expect(1)
        .mount(&platform)
        .await;

    let orchestrator = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/presigned"))
        .and(query_param("sig", "abc"))
        .and(body_partial_json(json!({
            "Status": "SUCCESS",
            "PhysicalResourceId": "usr_77",
            "RequestId": "req-1",
            "LogicalResourceId": "AdminUser",
            "Data": {"userName": "alice"},
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&orchestrator)
        .await;

    let request = parse(envelope(
        "Create",
        "Custom::DescopeUser",
        &format!("{}/presigned?sig=abc", orchestrator.uri()),
        json!({"ServiceToken": "arn:aws:lambda:fn", "loginId": "alice"}),
    ));

    let response = adapter(&platform, None).handle(&request).await;
    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.stack_id, STACK_ID);
}

#[tokio::test]
async fn test_failed_create_then_rollback_delete_touches_nothing() {
    let platform = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/mgmt/user/create"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid email"))
        .expect(1)
        .mount(&platform)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/mgmt/user/delete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&platform)
        .await;

    let orchestrator = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/presigned"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&orchestrator)
        .await;

    let adapter = adapter(&platform, None);
    let url = format!("{}/presigned", orchestrator.uri());

    let create = parse(envelope("Create", "Custom::DescopeUser", &url, json!({"loginId": "alice"})));
    let failed = adapter.handle(&create).await;

    assert_eq!(failed.status, ResponseStatus::Failed);
    assert!(is_placeholder(&failed.physical_resource_id));
    assert!(failed.reason.as_deref().unwrap_or_default().starts_with("CreationFailed"));
    assert!(failed.data.is_empty());

    let mut rollback = envelope("Delete", "Custom::DescopeUser", &url, json!({"loginId": "alice"}));
    rollback["PhysicalResourceId"] = json!(failed.physical_resource_id.clone());
    let deleted = adapter.handle(&parse(rollback)).await;

    assert_eq!(deleted.status, ResponseStatus::Success);
    assert_eq!(deleted.physical_resource_id, failed.physical_resource_id);

    let delivered: Vec<CustomResourceResponse> = orchestrator
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect();
    assert_eq!(delivered, vec![failed, deleted]);
}

#[tokio::test]
async fn test_unknown_resource_type_still_answers() {
    let platform = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&platform).await;

    let orchestrator = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(body_partial_json(json!({"Status": "FAILED"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&orchestrator)
        .await;

    let request = parse(envelope(
        "Create",
        "Custom::DescopeTenant",
        &format!("{}/presigned", orchestrator.uri()),
        json!({"loginId": "alice"}),
    ));

    let response = adapter(&platform, None).handle(&request).await;
    assert_eq!(response.status, ResponseStatus::Failed);
    assert!(response.reason.as_deref().unwrap_or_default().starts_with("ValidationError"));
}

#[tokio::test]
async fn test_default_kind_applies_to_generic_type() {
    let platform = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/mgmt/accesskey/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": {"id": "K1", "clientId": "C1"}})))
        .expect(1)
        .mount(&platform)
        .await;

    let request = parse(json!({
        "RequestType": "Create",
        "ResourceType": "Custom::Identity",
        "RequestId": "req-2",
        "LogicalResourceId": "CiKey",
        "ResourceProperties": {"Name": "ci"},
    }));

    let response = adapter(&platform, Some(ResourceKind::AccessKey)).process(&request).await;
    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.physical_resource_id, "K1");
    assert_eq!(response.data.get("ClientId").map(String::as_str), Some("C1"));
}

#[tokio::test]
async fn test_delivery_failure_does_not_lose_response() {
    let platform = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/mgmt/user/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&platform)
        .await;

    let orchestrator = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&orchestrator)
        .await;

    let mut body = envelope(
        "Delete",
        "Custom::DescopeUser",
        &format!("{}/presigned", orchestrator.uri()),
        json!({"loginId": "alice"}),
    );
    body["PhysicalResourceId"] = json!("usr_1");

    let response = adapter(&platform, None).handle(&parse(body)).await;
    assert_eq!(response.status, ResponseStatus::Success);
}

#[tokio::test]
async fn test_http_invoke_endpoint() {
    let platform = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/mgmt/user/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "usr_5"})))
        .expect(1)
        .mount(&platform)
        .await;

    let orchestrator = MockServer::start().await;
    Mock::given(method("PUT")).respond_with(ResponseTemplate::new(200)).expect(1).mount(&orchestrator).await;

    let server = TestServer::new(build_router(Arc::new(adapter(&platform, None)))).unwrap();
    let response = server
        .post("/invoke")
        .json(&envelope(
            "Create",
            "Custom::DescopeUser",
            &format!("{}/presigned", orchestrator.uri()),
            json!({"loginId": "carol"}),
        ))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["Status"], "SUCCESS");
    assert_eq!(body["PhysicalResourceId"], "usr_5");
}
