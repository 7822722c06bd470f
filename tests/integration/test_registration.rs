//! Device registration against a mock registry

use push_sdk::store::keys;
use push_sdk::{
    DeviceProfile, DeviceRegistration, HttpTransport, MemoryStore, PersistedState,
    RedirectPolicy, RegistrationError,
};
use push_sdk::transport::HttpTransportConfig;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

fn full_profile(profile: DeviceProfile) -> DeviceProfile {
    profile
        .with_device_token(common::token())
        .with_variant_id(common::VARIANT_ID)
        .with_variant_secret(common::VARIANT_SECRET)
}

// ============================================================================
// Success path
// ============================================================================

#[tokio::test]
async fn test_register_success_persists_identity() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/registry/device"))
        .and(header("Content-Type", "application/json"))
        .and(header("Authorization", common::auth_header().as_str()))
        .and(body_json(json!({
            "deviceToken": common::TOKEN_HEX,
            "alias": "john@example.com",
            "categories": ["football", "news"],
            "operatingSystem": "iOS",
            "osVersion": "17.2",
            "deviceType": "iPhone",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let registration = common::registration(&server, store.clone());

    registration
        .register(Some(|p: DeviceProfile| {
            full_profile(p)
                .with_alias("john@example.com")
                .with_categories(["news", "football"])
                .with_operating_system("iOS")
                .with_os_version("17.2")
                .with_device_type("iPhone")
        }))
        .await
        .expect("Registration failed");

    assert_eq!(store.get(keys::DEVICE_TOKEN).as_deref(), Some(common::TOKEN_HEX));
    assert_eq!(store.get(keys::VARIANT_ID).as_deref(), Some(common::VARIANT_ID));
    assert_eq!(store.get(keys::VARIANT_SECRET).as_deref(), Some(common::VARIANT_SECRET));
    assert_eq!(store.get(keys::SERVER_URL), Some(server.uri()));
}

#[tokio::test]
async fn test_register_with_context_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ag-push/rest/registry/device"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let registration = DeviceRegistration::new(store, common::transport())
        .with_server_url(format!("{}/ag-push", server.uri()).parse().unwrap());

    registration
        .register(Some(full_profile))
        .await
        .expect("Registration failed");
}

// ============================================================================
// Redirect tests
// ============================================================================

#[tokio::test]
async fn test_redirect_preserves_method_and_body() {
    for status in [301u16, 302, 303, 307, 308] {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/registry/device"))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("Location", format!("{}/moved/rest/registry/device", server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/moved/rest/registry/device"))
            .and(header("Authorization", common::auth_header().as_str()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let registration = common::registration(&server, store);

        registration
            .register(Some(full_profile))
            .await
            .unwrap_or_else(|e| panic!("Registration after {} failed: {}", status, e));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method.as_str(), "POST");
        assert_eq!(requests[1].url.path(), "/moved/rest/registry/device");
        assert_eq!(requests[0].body, requests[1].body);
        assert_eq!(
            requests[1].headers.get("content-type").map(|v| v.as_bytes()),
            Some("application/json".as_bytes())
        );
    }
}

#[tokio::test]
async fn test_relative_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/registry/device"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/v2/rest/registry/device"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/rest/registry/device"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let registration = common::registration(&server, Arc::new(MemoryStore::new()));
    registration
        .register(Some(full_profile))
        .await
        .expect("Registration failed");
}

#[tokio::test]
async fn test_redirect_loop_is_capped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/registry/device"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/rest/registry/device", server.uri())),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let transport = HttpTransport::with_config(
        HttpTransportConfig::default().with_redirect_policy(RedirectPolicy::Resubmit { max_hops: 3 }),
    )
    .unwrap();
    let registration = DeviceRegistration::new(store, Arc::new(transport))
        .with_server_url(server.uri().parse().unwrap());

    let err = registration.register(Some(full_profile)).await.unwrap_err();

    assert_eq!(err.status_code(), Some(302));
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_redirect_policy_none_returns_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/registry/device"))
        .respond_with(ResponseTemplate::new(307).insert_header("Location", "/elsewhere"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::with_config(
        HttpTransportConfig::default().with_redirect_policy(RedirectPolicy::None),
    )
    .unwrap();
    let registration = DeviceRegistration::new(Arc::new(MemoryStore::new()), Arc::new(transport))
        .with_server_url(server.uri().parse().unwrap());

    let err = registration.register(Some(full_profile)).await.unwrap_err();
    assert_eq!(err.status_code(), Some(307));
}

// ============================================================================
// Error handling tests
// ============================================================================

#[tokio::test]
async fn test_register_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/registry/device"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let registration = common::registration(&server, store.clone());

    let err = registration.register(Some(full_profile)).await.unwrap_err();

    match err {
        RegistrationError::ServerRejected {
            status_code,
            status_text,
        } => {
            assert_eq!(status_code, 401);
            assert_eq!(status_text, "Unauthorized");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // identity is written before the request is sent
    assert_eq!(store.get(keys::VARIANT_ID).as_deref(), Some(common::VARIANT_ID));
}

#[tokio::test]
async fn test_missing_fields_make_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let registration = common::registration(&server, Arc::new(MemoryStore::new()));

    let err = registration
        .register(Some(|p: DeviceProfile| {
            p.with_device_token(common::token())
                .with_variant_id(common::VARIANT_ID)
        }))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::MissingVariantSecret));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let store = Arc::new(MemoryStore::new());
    let registration = DeviceRegistration::new(store, common::transport())
        .with_server_url("http://127.0.0.1:1".parse().unwrap());

    let err = registration.register(Some(full_profile)).await.unwrap_err();

    assert!(matches!(err, RegistrationError::Network(_)));
    assert!(err.is_recoverable());
}
