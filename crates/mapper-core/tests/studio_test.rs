#![allow(clippy::unwrap_used)]
// Integration tests for the `Studio` auth flow and list slices using wiremock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mapper_api::ErrorKind;
use mapper_api::types::{ListQuery, NotificationFilter, ProfileUpdate};
use mapper_core::storage::{AUTH_TOKEN, REFRESH_TOKEN, USER};
use mapper_core::{
    AuthPhase, GuardDecision, LoginForm, MemoryStorage, Route, Storage, Studio, StudioConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_with(entries: &[(&str, &str)]) -> (MockServer, Studio) {
    let server = MockServer::start().await;
    let config = StudioConfig {
        api_url: format!("{}/api", server.uri()),
        ..StudioConfig::default()
    };
    let storage = Arc::new(MemoryStorage::with_entries(entries.iter().copied()));
    let studio = Studio::with_storage(config, storage).unwrap();
    (server, studio)
}

async fn setup() -> (MockServer, Studio) {
    setup_with(&[]).await
}

fn stored(studio: &Studio, key: &str) -> Option<String> {
    studio.session().storage().get(key)
}

fn user_json() -> Value {
    json!({
        "id": "u1",
        "username": "alice",
        "email": "alice@example.net",
        "firstName": "Alice",
        "lastName": "Ng",
        "role": "network_engineer",
        "permissions": [],
        "isActive": true,
        "createdAt": "2026-01-10T08:00:00Z",
        "updatedAt": "2026-01-10T08:00:00Z"
    })
}

fn device_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("rtr-{id}"),
        "hostname": format!("rtr-{id}.lab"),
        "ipAddress": "192.0.2.10",
        "port": 830,
        "vendor": "juniper",
        "deviceType": "router",
        "protocol": "netconf",
        "credentials": { "username": "netops" },
        "connectionStatus": "connected",
        "isActive": true,
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z"
    })
}

fn device_page(ids: &[&str], page: u32) -> Value {
    json!({
        "devices": ids.iter().map(|id| device_json(id)).collect::<Vec<_>>(),
        "pagination": {
            "page": page,
            "limit": 2,
            "total": 6,
            "totalPages": 3,
            "hasNext": page < 3,
            "hasPrev": page > 1
        }
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "alice", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user_json(),
            "token": "T",
            "refreshToken": "R"
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_persists_tokens_and_user() {
    let (server, studio) = setup().await;
    mount_login(&server).await;

    let user = studio.login(&LoginForm::new("alice", "pw")).await.unwrap();
    assert_eq!(user.username, "alice");

    assert_eq!(stored(&studio, AUTH_TOKEN).as_deref(), Some("T"));
    assert_eq!(stored(&studio, REFRESH_TOKEN).as_deref(), Some("R"));
    let snapshot: Value = serde_json::from_str(&stored(&studio, USER).unwrap()).unwrap();
    assert_eq!(snapshot["username"], "alice");

    let auth = studio.auth();
    assert_eq!(auth.phase(), AuthPhase::Authenticated);
    assert!(auth.error.is_none());
    assert_eq!(studio.navigator().location(), Route::Dashboard);
}

#[tokio::test]
async fn test_login_failure_records_error() {
    let (server, studio) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let err = studio
        .login(&LoginForm::new("alice", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "401");

    let auth = studio.auth();
    assert!(!auth.is_loading);
    assert!(!auth.is_authenticated);
    assert_eq!(auth.error.as_deref(), Some("Invalid credentials"));
    assert!(stored(&studio, AUTH_TOKEN).is_none());
}

#[tokio::test]
async fn test_empty_login_form_never_reaches_network() {
    let (server, studio) = setup().await;

    let err = studio.login(&LoginForm::default()).await.unwrap_err();

    assert!(err.is_validation());
    let details = err.api().and_then(|e| e.details.clone()).unwrap();
    assert_eq!(
        details,
        json!({
            "username": "Username is required",
            "password": "Password is required"
        })
    );
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(studio.auth().phase(), AuthPhase::Anonymous);
}

// ── Logout ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logout_clears_storage_when_call_fails() {
    let (server, studio) = setup_with(&[
        (AUTH_TOKEN, "T"),
        (REFRESH_TOKEN, "R"),
        (USER, "{}"),
    ])
    .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    studio.logout().await;

    assert!(stored(&studio, AUTH_TOKEN).is_none());
    assert!(stored(&studio, REFRESH_TOKEN).is_none());
    assert!(stored(&studio, USER).is_none());
    assert_eq!(studio.auth().phase(), AuthPhase::Anonymous);
    assert_eq!(studio.navigator().location(), Route::Login);
}

#[tokio::test]
async fn test_logout_clears_storage_when_backend_unreachable() {
    let (server, studio) = setup_with(&[(AUTH_TOKEN, "T"), (REFRESH_TOKEN, "R")]).await;
    drop(server);

    studio.logout().await;

    assert!(stored(&studio, AUTH_TOKEN).is_none());
    assert!(stored(&studio, REFRESH_TOKEN).is_none());
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_without_token_makes_no_request() {
    let (server, studio) = setup_with(&[(AUTH_TOKEN, "T")]).await;

    let err = studio.refresh_token().await.unwrap_err();

    let api = err.api().unwrap();
    assert_eq!(api.code, "NO_REFRESH_TOKEN");
    assert_eq!(api.kind, ErrorKind::NoRefreshToken);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refresh_persists_new_pair() {
    let (server, studio) = setup_with(&[(AUTH_TOKEN, "T"), (REFRESH_TOKEN, "R")]).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "R" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "T2", "refreshToken": "R2" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    studio.refresh_token().await.unwrap();

    assert_eq!(stored(&studio, AUTH_TOKEN).as_deref(), Some("T2"));
    assert_eq!(stored(&studio, REFRESH_TOKEN).as_deref(), Some("R2"));
}

// ── 401 handling ────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_response_ends_session() {
    let (server, studio) = setup().await;
    mount_login(&server).await;
    studio.login(&LoginForm::new("alice", "pw")).await.unwrap();

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })))
        .expect(1)
        .mount(&server)
        .await;

    let err = studio.fetch_devices(&ListQuery::default()).await.unwrap_err();
    assert_eq!(err.code(), "401");

    assert!(stored(&studio, AUTH_TOKEN).is_none());
    assert!(stored(&studio, REFRESH_TOKEN).is_none());
    assert!(stored(&studio, USER).is_some());
    assert!(!studio.auth().is_authenticated);
    assert_eq!(studio.navigator().location(), Route::Login);
    assert_eq!(
        studio.slices().devices.state().error.as_deref(),
        Some("Token expired")
    );
}

// ── Bootstrap ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_bootstrap_without_token_settles_anonymous() {
    let (server, studio) = setup().await;

    let auth = studio.bootstrap().await;

    assert_eq!(auth.phase(), AuthPhase::Anonymous);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bootstrap_confirms_stored_token() {
    let (server, studio) = setup_with(&[(AUTH_TOKEN, "T")]).await;
    assert_eq!(studio.navigate("/devices"), GuardDecision::Loading);

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let auth = studio.bootstrap().await;

    assert_eq!(auth.phase(), AuthPhase::Authenticated);
    assert_eq!(auth.user.unwrap().username, "alice");
    assert!(stored(&studio, USER).is_some());
    assert_eq!(studio.navigate("/devices/42"), GuardDecision::Allow);
    assert_eq!(studio.navigator().location(), Route::Devices);
}

#[tokio::test]
async fn test_bootstrap_rejected_token_clears_storage() {
    let (server, studio) = setup_with(&[(AUTH_TOKEN, "stale"), (REFRESH_TOKEN, "R")]).await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let auth = studio.bootstrap().await;

    assert_eq!(auth.phase(), AuthPhase::Anonymous);
    assert!(stored(&studio, AUTH_TOKEN).is_none());
    assert!(stored(&studio, REFRESH_TOKEN).is_none());
    assert_eq!(studio.navigator().location(), Route::Login);
}

// ── Route guard ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_guard_redirects_follow_session() {
    let (server, studio) = setup().await;
    studio.bootstrap().await;

    assert_eq!(
        studio.navigate("/dashboard"),
        GuardDecision::Redirect(Route::Login)
    );
    assert_eq!(studio.navigator().location(), Route::Login);

    mount_login(&server).await;
    studio.login(&LoginForm::new("alice", "pw")).await.unwrap();

    assert_eq!(
        studio.navigate("/login"),
        GuardDecision::Redirect(Route::Dashboard)
    );
    assert_eq!(studio.navigator().location(), Route::Dashboard);
    assert_eq!(studio.navigate("/no-such-page"), GuardDecision::Allow);
    assert_eq!(studio.navigator().location(), Route::NotFound);
}

// ── Slices ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_overlapping_fetches_last_resolved_wins() {
    let (server, studio) = setup_with(&[(AUTH_TOKEN, "T")]).await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(device_page(&["a", "b"], 1))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_page(&["c", "d"], 2)))
        .mount(&server)
        .await;

    let first = ListQuery::new(1, 2);
    let second = ListQuery::new(2, 2);
    let (r1, r2) = tokio::join!(studio.fetch_devices(&first), studio.fetch_devices(&second));
    r1.unwrap();
    r2.unwrap();

    let state = studio.slices().devices.state();
    assert!(!state.is_loading);
    let ids: Vec<_> = state.items.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(state.pagination.page, 1);
}

#[tokio::test]
async fn test_notifications_update_unread_badge() {
    let (server, studio) = setup_with(&[(AUTH_TOKEN, "T")]).await;

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [{
                "id": "n1",
                "type": "warning",
                "title": "Device unreachable",
                "message": "rtr-a stopped answering NETCONF",
                "severity": "high",
                "category": "devices",
                "isRead": false,
                "isGlobal": false,
                "createdAt": "2026-02-01T10:00:00Z"
            }],
            "pagination": {
                "page": 1, "limit": 20, "total": 1,
                "totalPages": 1, "hasNext": false, "hasPrev": false
            },
            "unreadCount": 5
        })))
        .mount(&server)
        .await;

    let state = studio
        .fetch_notifications(&NotificationFilter::default())
        .await
        .unwrap();

    assert_eq!(state.items.len(), 1);
    assert_eq!(studio.ui().state().notifications.unread_count, 5);
}

#[tokio::test]
async fn test_profile_update_persists_snapshot() {
    let (server, studio) = setup_with(&[(AUTH_TOKEN, "T")]).await;

    let mut updated = user_json();
    updated["firstName"] = json!("Alicia");
    Mock::given(method("PUT"))
        .and(path("/api/auth/profile"))
        .and(body_json(json!({ "firstName": "Alicia" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&server)
        .await;

    let update = ProfileUpdate {
        first_name: Some("Alicia".into()),
        ..ProfileUpdate::default()
    };
    let user = studio.update_profile(&update).await.unwrap();

    assert_eq!(user.first_name, "Alicia");
    assert_eq!(
        studio.session().stored_user().map(|u| u.first_name).as_deref(),
        Some("Alicia")
    );
}

// ── Persistence ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_file_storage_carries_session_across_instances() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let config = StudioConfig {
        api_url: format!("{}/api", server.uri()),
        storage_path: Some(dir.path().join("storage.json")),
        ..StudioConfig::default()
    };

    let studio = Studio::new(config.clone()).unwrap();
    studio.login(&LoginForm::new("alice", "pw")).await.unwrap();
    drop(studio);

    let restored = Studio::new(config).unwrap();
    assert_eq!(restored.auth().phase(), AuthPhase::Authenticating);
    assert_eq!(stored(&restored, AUTH_TOKEN).as_deref(), Some("T"));
}

// ── Live updates ────────────────────────────────────────────────────

#[tokio::test]
async fn test_updates_require_token() {
    let (_server, studio) = setup().await;

    let err = studio.subscribe_to_updates(|_| {}).unwrap_err();

    assert_eq!(err.code(), "NO_AUTH_TOKEN");
}
