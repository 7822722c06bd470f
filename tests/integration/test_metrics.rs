//! Push metrics against a mock registry

use push_sdk::{ApplicationState, MemoryStore, MetricsError, PushAnalytics};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_metrics_success() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/rest/registry/device/pushMessage/123"))
        .and(header("Authorization", common::auth_header().as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let analytics = common::registered_analytics(&server);
    analytics.send_metrics("123").await.expect("Metrics failed");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_launch_hook_sends_metrics() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/rest/registry/device/pushMessage/m1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let analytics = common::registered_analytics(&server);
    analytics
        .send_metrics_when_app_launched(Some(&json!({"aerogear-push-id": "m1"})))
        .await
        .expect("Launch hook failed");
}

#[tokio::test]
async fn test_hooks_without_message_id_make_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let analytics = common::registered_analytics(&server);
    let payload = json!({"aps": {"alert": "hello"}});

    analytics
        .send_metrics_when_app_launched(Some(&payload))
        .await
        .unwrap();
    analytics.send_metrics_when_app_launched(None).await.unwrap();
    analytics
        .send_metrics_when_app_awoken(ApplicationState::Background, &payload)
        .await
        .unwrap();
    analytics
        .send_metrics_when_app_awoken(
            ApplicationState::Active,
            &json!({"aerogear-push-id": "m1"}),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_wake_hook_from_background() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/rest/registry/device/pushMessage/m2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let analytics = common::registered_analytics(&server);
    analytics
        .send_metrics_when_app_awoken(ApplicationState::Inactive, &json!({"aerogear-push-id": "m2"}))
        .await
        .expect("Wake hook failed");
}

#[tokio::test]
async fn test_metrics_not_registered() {
    let analytics = PushAnalytics::new(Arc::new(MemoryStore::new()), common::transport());

    let err = analytics.send_metrics("123").await.unwrap_err();
    assert!(matches!(err, MetricsError::NotRegistered));
}

#[tokio::test]
async fn test_metrics_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let analytics = common::registered_analytics(&server);
    let err = analytics.send_metrics("123").await.unwrap_err();

    match err {
        MetricsError::ServerRejected {
            status_code,
            status_text,
        } => {
            assert_eq!(status_code, 500);
            assert_eq!(status_text, "Internal Server Error");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_metrics_follow_redirect_with_put() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/rest/registry/device/pushMessage/123"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "/new/pushMessage/123"),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/new/pushMessage/123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let analytics = common::registered_analytics(&server);
    analytics.send_metrics("123").await.expect("Metrics failed");
}
