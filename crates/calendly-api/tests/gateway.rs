//! Wire-level tests for the gateway and the OAuth flows, backed by wiremock.

use std::sync::Arc;

use calendly_api::{
    ApiError, CalendlyClient, CredentialConfig, CredentialStore, CreateOneOffEventType, Defaults,
    ListEventsParams,
};
use serde_json::json;
use wiremock::matchers::{
    body_json, body_string_contains, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEFAULT_USER: &str = "https://api.calendly.com/users/DEFAULT";

fn token_store(server: &MockServer) -> Arc<CredentialStore> {
    Arc::new(
        CredentialStore::new(CredentialConfig {
            api_key: Some("test-token".to_string()),
            auth_base_url: Some(server.uri()),
            ..CredentialConfig::default()
        })
        .expect("store should build"),
    )
}

fn client(server: &MockServer, defaults: Defaults) -> CalendlyClient {
    CalendlyClient::new(token_store(server), defaults, Some(&server.uri()))
        .expect("client should build")
}

#[tokio::test]
async fn list_events_falls_back_to_default_user_and_omits_unset_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scheduled_events"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("user", DEFAULT_USER))
        .and(query_param("count", "10"))
        .and(query_param_is_missing("organization"))
        .and(query_param_is_missing("status"))
        .and(query_param_is_missing("min_start_time"))
        .and(query_param_is_missing("max_start_time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "collection": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(
        &server,
        Defaults {
            user_uri: Some(DEFAULT_USER.to_string()),
            organization_uri: None,
        },
    );

    let body = client
        .list_events(ListEventsParams {
            count: Some(10),
            ..ListEventsParams::default()
        })
        .await
        .expect("list_events should succeed");

    assert!(body["collection"].as_array().is_some_and(Vec::is_empty));
}

#[tokio::test]
async fn list_events_with_explicit_organization_skips_the_user_default() {
    let server = MockServer::start().await;
    let org = "https://api.calendly.com/organizations/ORG1";

    Mock::given(method("GET"))
        .and(path("/scheduled_events"))
        .and(query_param("organization", org))
        .and(query_param_is_missing("user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "collection": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(
        &server,
        Defaults {
            user_uri: Some(DEFAULT_USER.to_string()),
            organization_uri: None,
        },
    );

    client
        .list_events(ListEventsParams {
            organization_uri: Some(org.to_string()),
            ..ListEventsParams::default()
        })
        .await
        .expect("list_events should succeed");
}

#[tokio::test]
async fn upstream_errors_are_propagated_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scheduled_events/MISSING"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "title": "Resource Not Found" })),
        )
        .mount(&server)
        .await;

    let client = client(&server, Defaults::default());
    let error = client
        .get_event("MISSING")
        .await
        .expect_err("404 should surface as an error");

    match error {
        ApiError::Upstream { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("Resource Not Found"));
        }
        other => panic!("expected Upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn cancel_event_defaults_the_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/scheduled_events/EVT1/cancellation"))
        .and(body_json(json!({ "reason": "No reason provided" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "resource": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Defaults::default());
    client
        .cancel_event("EVT1", None)
        .await
        .expect("cancel should succeed");
}

#[tokio::test]
async fn cancel_event_sends_the_supplied_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/scheduled_events/EVT1/cancellation"))
        .and(body_json(json!({ "reason": "double booked" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "resource": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Defaults::default());
    client
        .cancel_event("EVT1", Some("double booked"))
        .await
        .expect("cancel should succeed");
}

#[tokio::test]
async fn create_one_off_event_type_substitutes_the_default_host() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/one_off_event_types"))
        .and(body_json(json!({
            "name": "Intro Call",
            "host": DEFAULT_USER,
            "duration": 30,
            "timezone": "UTC",
            "date_setting": {
                "type": "date_range",
                "start_date": "2026-01-01",
                "end_date": "2026-01-02"
            },
            "location": { "kind": "custom", "location": "TBD" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "resource": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(
        &server,
        Defaults {
            user_uri: Some(DEFAULT_USER.to_string()),
            organization_uri: None,
        },
    );

    client
        .create_one_off_event_type(CreateOneOffEventType {
            name: "Intro Call".to_string(),
            host: None,
            co_hosts: None,
            duration: 30,
            timezone: "UTC".to_string(),
            date_setting: json!({
                "type": "date_range",
                "start_date": "2026-01-01",
                "end_date": "2026-01-02"
            }),
            location: json!({ "kind": "custom", "location": "TBD" }),
        })
        .await
        .expect("create should succeed");
}

#[tokio::test]
async fn invalid_event_uuid_never_reaches_the_network() {
    let server = MockServer::start().await;
    // No mocks mounted: any request would 404 and the strict expectation
    // below would fail the test.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, Defaults::default());
    let error = client
        .get_event("abc/def")
        .await
        .expect_err("slash in uuid should be rejected");
    assert!(matches!(error, ApiError::InvalidPathSegment("event_uuid")));
}

#[tokio::test]
async fn exchange_then_refresh_threads_the_stored_pair() {
    let server = MockServer::start().await;
    // base64("client-1:secret-1")
    let basic = "Basic Y2xpZW50LTE6c2VjcmV0LTE=";

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("authorization", basic))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "token_type": "Bearer",
            "expires_in": 7200,
            "scope": "default"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("authorization", basic))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=rt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-2",
            "refresh_token": "rt-2",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = CredentialStore::new(CredentialConfig {
        client_id: Some("client-1".to_string()),
        client_secret: Some("secret-1".to_string()),
        auth_base_url: Some(server.uri()),
        ..CredentialConfig::default()
    })
    .expect("store should build");

    let exchanged = store
        .exchange_code("auth-code", "https://cb")
        .await
        .expect("exchange should succeed");
    assert_eq!(exchanged.access_token, "at-1");

    // No explicit token: the refresh must reuse the pair stored above.
    let refreshed = store.refresh(None).await.expect("refresh should succeed");
    assert_eq!(refreshed.access_token, "at-2");

    let pair = store.token_pair().await;
    assert_eq!(pair.access_token.as_deref(), Some("at-2"));
    assert_eq!(pair.refresh_token.as_deref(), Some("rt-2"));

    // With no static key the gateway bearer comes from the stored pair.
    assert_eq!(store.bearer_token().await.unwrap(), "at-2");
}
