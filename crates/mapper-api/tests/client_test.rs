#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mapper_api::error::{INVALID_RESPONSE, NETWORK_ERROR, UNKNOWN_ERROR};
use mapper_api::types::{
    ConnectionStatus, ListQuery, LogQuery, NotificationFilter, NotificationType, YangSearch,
};
use mapper_api::{ApiClient, ErrorKind, SessionHandle, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSession {
    token: Option<String>,
    unauthorized: AtomicUsize,
}

impl RecordingSession {
    fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    fn unauthorized_calls(&self) -> usize {
        self.unauthorized.load(Ordering::SeqCst)
    }
}

impl SessionHandle for RecordingSession {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token.clone().map(SecretString::from)
    }

    fn unauthorized(&self) {
        self.unauthorized.fetch_add(1, Ordering::SeqCst);
    }
}

async fn setup_with(session: RecordingSession) -> (MockServer, ApiClient, Arc<RecordingSession>) {
    let server = MockServer::start().await;
    let session = Arc::new(session);
    let client = ApiClient::new(
        &format!("{}/api", server.uri()),
        &TransportConfig::default(),
        session.clone(),
    )
    .unwrap();
    (server, client, session)
}

async fn setup() -> (MockServer, ApiClient, Arc<RecordingSession>) {
    setup_with(RecordingSession::with_token("tok-123")).await
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
        "connectionStatus": "disconnected",
        "yangModels": [],
        "capabilities": [],
        "isActive": true,
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z"
    })
}

fn pagination(page: u32, limit: u32, total: u64) -> Value {
    json!({
        "page": page,
        "limit": limit,
        "total": total,
        "totalPages": 3,
        "hasNext": true,
        "hasPrev": true
    })
}

// ── Authorization header ────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_attached_when_present() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "username": "alice",
            "email": "alice@example.net",
            "firstName": "Alice",
            "lastName": "Ng",
            "role": "admin",
            "permissions": [],
            "isActive": true,
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.current_user().await.unwrap();
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let (server, client, _) = setup_with(RecordingSession::default()).await;

    Mock::given(method("GET"))
        .and(path("/api/devices/connected"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let devices = client.connected_devices().await.unwrap();
    assert!(devices.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

// ── 401 handling ────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_notifies_session_once_and_returns_error() {
    let (server, client, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices/d1"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })),
        )
        .mount(&server)
        .await;

    let err = client.get_device("d1").await.unwrap_err();

    assert_eq!(session.unauthorized_calls(), 1);
    assert!(err.is_unauthorized());
    assert_eq!(err.code, "401");
    assert_eq!(err.message, "Token expired");
}

#[tokio::test]
async fn test_forbidden_does_not_end_session() {
    let (server, client, session) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/services/s1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Forbidden" })))
        .mount(&server)
        .await;

    let err = client.delete_service("s1").await.unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(session.unauthorized_calls(), 0);
}

// ── Lists and queries ───────────────────────────────────────────────

#[tokio::test]
async fn test_list_sends_exact_query_and_keeps_pagination() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .and(query_param("search", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [device_json("d1"), device_json("d2")],
            "pagination": pagination(2, 10, 27)
        })))
        .mount(&server)
        .await;

    let page = client.list_devices(&ListQuery::new(2, 10)).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1].id, "d2");
    assert_eq!(page.items[0].connection_status, ConnectionStatus::Disconnected);
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.total, 27);
    assert_eq!(page.pagination.total_pages, 3);
    assert!(page.pagination.has_next && page.pagination.has_prev);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("page=2&limit=10&search="));
}

#[tokio::test]
async fn test_yang_search_omits_unset_filters() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/yang-models/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let search = YangSearch {
        vendor: Some("cisco".into()),
        ..YangSearch::new("interfaces")
    };
    client.search_yang_models(&search).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("query=interfaces&vendor=cisco"));
}

#[tokio::test]
async fn test_namespace_segment_is_percent_encoded() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path(
            "/api/yang-models/namespace/urn%3Aietf%3Aparams%3Axml%3Ans%3Ayang%3Aietf-interfaces",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let models = client
        .yang_models_by_namespace("urn:ietf:params:xml:ns:yang:ietf-interfaces")
        .await
        .unwrap();
    assert!(models.is_empty());
}

#[tokio::test]
async fn test_notification_filters_and_unread_count() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .and(query_param("type", "error"))
        .and(query_param("isRead", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [],
            "pagination": pagination(1, 20, 0),
            "unreadCount": 4
        })))
        .mount(&server)
        .await;

    let filter = NotificationFilter {
        kind: Some(NotificationType::Error),
        is_read: Some(false),
        ..NotificationFilter::default()
    };
    let page = client.list_notifications(&filter).await.unwrap();
    assert_eq!(page.unread_count, 4);
}

#[tokio::test]
async fn test_service_logs_default_limit() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/services/s1/logs"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "timestamp": "2026-06-01T00:00:00Z", "level": "info", "message": "deployed" }
        ])))
        .mount(&server)
        .await;

    let logs = client.service_logs("s1", &LogQuery::default()).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, "deployed");
}

// ── Request bodies ──────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_posts_refresh_token() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "r-1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "t-2", "refreshToken": "r-2" })),
        )
        .mount(&server)
        .await;

    let pair = client.refresh(&SecretString::from("r-1")).await.unwrap();
    assert_eq!(pair.token, "t-2");
    assert_eq!(pair.refresh_token, "r-2");
}

#[tokio::test]
async fn test_bulk_connect_sends_device_ids() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices/bulk-connect"))
        .and(body_json(json!({ "deviceIds": ["d1", "d2"] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": ["d1"], "failed": ["d2"] })),
        )
        .mount(&server)
        .await;

    let result = client
        .bulk_connect_devices(&["d1".to_owned(), "d2".to_owned()])
        .await
        .unwrap();
    assert_eq!(result.success, ["d1"]);
    assert_eq!(result.failed, ["d2"]);
}

#[tokio::test]
async fn test_export_devices_without_ids_sends_empty_object() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices/export"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"name,host\nr1,10.0.0.1\n".to_vec()))
        .mount(&server)
        .await;

    let bytes = client.export_devices(None).await.unwrap();
    assert_eq!(&bytes[..], b"name,host\nr1,10.0.0.1\n");
}

#[tokio::test]
async fn test_void_endpoints_accept_empty_and_non_empty_bodies() {
    let (server, client, _) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/devices/d1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/notifications/mark-all-read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updated": 12 })))
        .mount(&server)
        .await;

    client.delete_device("d1").await.unwrap();
    client.mark_all_notifications_read().await.unwrap();
}

// ── Error normalization ─────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_without_message_uses_status_text() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/s1/deploy"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client.deploy_service("s1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server { status: 500 });
    assert_eq!(err.code, "500");
    assert_eq!(err.message, "Request failed with status code 500");
    assert_eq!(err.details, Some(json!("upstream exploded")));
}

#[tokio::test]
async fn test_server_error_keeps_json_details() {
    let (server, client, _) = setup().await;

    let body = json!({ "message": "Name already taken", "field": "name" });
    Mock::given(method("POST"))
        .and(path("/api/templates"))
        .respond_with(ResponseTemplate::new(409).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let err = client
        .create_template(&json!({ "name": "dup" }))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.message, "Name already taken");
    assert_eq!(err.details, Some(body));
}

#[tokio::test]
async fn test_malformed_success_body() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let err = client.get_device("d1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedResponse);
    assert_eq!(err.code, INVALID_RESPONSE);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let server = MockServer::start().await;
    let base = format!("{}/api", server.uri());
    drop(server);

    let client = ApiClient::new(
        &base,
        &TransportConfig::default(),
        Arc::new(RecordingSession::default()),
    )
    .unwrap();

    let err = client.connected_devices().await.unwrap_err();
    assert_eq!(err.code, NETWORK_ERROR);
    assert_eq!(
        err.message,
        "Network error occurred. Please check your connection."
    );
    assert!(err.is_network());
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;
    let client = ApiClient::new(
        &format!("{}/api", server.uri()),
        &TransportConfig::default().with_timeout(Duration::from_millis(100)),
        Arc::new(RecordingSession::default()),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/devices/connected"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.connected_devices().await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_unreadable_upload_is_unknown_error() {
    let (server, client, _) = setup().await;

    let err = client
        .import_devices(std::path::Path::new("/nonexistent/devices.csv"), |_| {})
        .await
        .unwrap_err();
    assert_eq!(err.code, UNKNOWN_ERROR);
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Uploads ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_reports_progress_ending_at_100() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices/import"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"file\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "imported": 3, "failed": 0, "errors": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&vec![b'x'; 300 * 1024]).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let summary = client
        .import_devices(file.path(), move |pct| sink.lock().unwrap().push(pct))
        .await
        .unwrap();

    assert_eq!(summary.imported, 3);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "not monotonic: {seen:?}");
}

#[tokio::test]
async fn test_yang_import_sends_indexed_file_fields() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/yang-models/import"))
        .and(body_string_contains("name=\"files[0]\""))
        .and(body_string_contains("name=\"files[1]\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "imported": [],
            "failed": [{ "filename": "broken.yang", "error": "syntax error at line 3" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.yang");
    let broken = dir.path().join("broken.yang");
    std::fs::write(&good, "module good { }").unwrap();
    std::fs::write(&broken, "module broken {").unwrap();

    let report = client.import_yang_models(&[good, broken]).await.unwrap();
    assert!(report.imported.is_empty());
    assert_eq!(report.failed[0].filename, "broken.yang");
}
