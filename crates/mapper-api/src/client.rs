// HTTP client wrapper for the Mapper backend.
//
// One configured reqwest::Client per backend. Attaches the bearer token
// supplied by the session handle, reports 401s back to it, and normalizes
// every failure into `ApiError`. Resource endpoints live in `resources/`
// as inherent methods so this module stays focused on transport mechanics.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ApiResult, Error};
use crate::session::SessionHandle;
use crate::transport::TransportConfig;

/// Default backend base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Mapper REST API.
///
/// Cheap to clone: the reqwest client and session handle are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionHandle>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` using the given transport settings.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        session: Arc<dyn SessionHandle>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, session)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        session: Arc<dyn SessionHandle>,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            session,
        })
    }

    /// The backend base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a resource path (`"devices/42"` or `"/devices/42"`) onto the base URL.
    fn url(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::unknown(format!("invalid request path '{path}': {e}")))
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let resp = self.send(Method::GET, path, |req| req).await?;
        decode(resp).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        let resp = self.send(Method::GET, path, |req| req.query(query)).await?;
        decode(resp).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let resp = self.send(Method::POST, path, |req| req.json(body)).await?;
        decode(resp).await
    }

    /// POST with no request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let resp = self.send(Method::POST, path, |req| req).await?;
        decode(resp).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let resp = self.send(Method::PUT, path, |req| req.json(body)).await?;
        decode(resp).await
    }

    /// PUT with no request body (state toggles such as mark-as-read).
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let resp = self.send(Method::PUT, path, |req| req).await?;
        decode(resp).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let resp = self.send(Method::PATCH, path, |req| req.json(body)).await?;
        decode(resp).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let resp = self.send(Method::DELETE, path, |req| req).await?;
        decode(resp).await
    }

    // ── Body-less variants ───────────────────────────────────────────
    //
    // Endpoints whose success body carries nothing the caller needs.
    // The body is dropped unread so any payload shape is accepted.

    pub(crate) async fn post_unit<B>(&self, path: &str, body: Option<&B>) -> ApiResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(Method::POST, path, |req| match body {
            Some(body) => req.json(body),
            None => req,
        })
        .await
        .map(drop)
    }

    pub(crate) async fn put_unit<B>(&self, path: &str, body: Option<&B>) -> ApiResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(Method::PUT, path, |req| match body {
            Some(body) => req.json(body),
            None => req,
        })
        .await
        .map(drop)
    }

    pub(crate) async fn delete_unit(&self, path: &str) -> ApiResult<()> {
        self.send(Method::DELETE, path, |req| req).await.map(drop)
    }

    // ── Raw downloads ────────────────────────────────────────────────

    /// GET returning the raw body (exports, generated documentation).
    pub async fn get_bytes(&self, path: &str) -> ApiResult<Bytes> {
        let resp = self.send(Method::GET, path, |req| req).await?;
        resp.bytes().await.map_err(|e| ApiError::from_transport(&e))
    }

    /// POST returning the raw body.
    pub async fn post_bytes<B>(&self, path: &str, body: &B) -> ApiResult<Bytes>
    where
        B: Serialize + ?Sized + Sync,
    {
        let resp = self.send(Method::POST, path, |req| req.json(body)).await?;
        resp.bytes().await.map_err(|e| ApiError::from_transport(&e))
    }

    // ── Uploads ──────────────────────────────────────────────────────

    /// Upload one file as the multipart field `file`.
    ///
    /// `on_progress` receives whole percentages as the body is streamed out.
    /// Values never decrease and the last one reported is 100.
    pub async fn upload<T, F>(&self, path: &str, file: &Path, on_progress: F) -> ApiResult<T>
    where
        T: DeserializeOwned,
        F: FnMut(u8) + Send + Sync + 'static,
    {
        let data = read_upload(file).await?;
        let total = data.len();
        let mut progress = Progress::new(total, on_progress);

        let body = if total == 0 {
            progress.finish();
            reqwest::Body::from(Bytes::new())
        } else {
            let stream = async_stream::stream! {
                let mut offset = 0;
                while offset < total {
                    let end = (offset + UPLOAD_CHUNK_SIZE).min(total);
                    let chunk = data.slice(offset..end);
                    offset = end;
                    progress.advance(chunk.len());
                    yield Ok::<Bytes, std::io::Error>(chunk);
                }
            };
            reqwest::Body::wrap_stream(stream)
        };

        let length = u64::try_from(total).unwrap_or(u64::MAX);
        let part = Part::stream_with_length(body, length)
            .file_name(file_name(file))
            .mime_str("application/octet-stream")
            .map_err(|e| ApiError::unknown(e.to_string()))?;
        let form = Form::new().part("file", part);

        let resp = self
            .send(Method::POST, path, |req| req.multipart(form))
            .await?;
        decode(resp).await
    }

    /// Upload several files as `files[0]`, `files[1]`, ...
    pub async fn upload_files<T: DeserializeOwned>(
        &self,
        path: &str,
        files: &[PathBuf],
    ) -> ApiResult<T> {
        let mut form = Form::new();
        for (index, file) in files.iter().enumerate() {
            let data = read_upload(file).await?;
            let length = u64::try_from(data.len()).unwrap_or(u64::MAX);
            let part = Part::stream_with_length(reqwest::Body::from(data), length)
                .file_name(file_name(file));
            form = form.part(format!("files[{index}]"), part);
        }

        let resp = self
            .send(Method::POST, path, |req| req.multipart(form))
            .await?;
        decode(resp).await
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Build, authorize and send one request.
    ///
    /// Non-2xx responses come back as `Err`. A 401 is reported to the
    /// session handle before the error is returned.
    async fn send(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder + Send,
    ) -> ApiResult<reqwest::Response> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut req = build(self.http.request(method, url));
        if let Some(token) = self.session.bearer_token() {
            req = req.bearer_auth(token.expose_secret());
        }

        let resp = req.send().await.map_err(|e| ApiError::from_transport(&e))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %resp.url(), "request rejected with 401, ending session");
            self.session.unauthorized();
        }

        Err(error_from_response(status, resp).await)
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> ApiResult<T> {
    let body = resp.text().await.map_err(|e| ApiError::from_transport(&e))?;
    let source = if body.trim().is_empty() {
        "null"
    } else {
        body.as_str()
    };
    serde_json::from_str(source)
        .map_err(|e| ApiError::malformed(format!("Unexpected response from server: {e}"), &body))
}

async fn error_from_response(status: StatusCode, resp: reqwest::Response) -> ApiError {
    let raw = resp.text().await.unwrap_or_default();
    let details = if raw.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw)))
    };

    let message = details
        .as_ref()
        .and_then(|d| d.get("message"))
        .and_then(Value::as_str)
        .map_or_else(
            || format!("Request failed with status code {}", status.as_u16()),
            str::to_owned,
        );

    ApiError::server(status.as_u16(), message, details)
}

// ── Helpers ──────────────────────────────────────────────────────────

fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}

async fn read_upload(file: &Path) -> ApiResult<Bytes> {
    tokio::fs::read(file)
        .await
        .map(Bytes::from)
        .map_err(|e| ApiError::unknown(format!("cannot read {}: {e}", file.display())))
}

fn file_name(file: &Path) -> String {
    file.file_name()
        .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned())
}

/// Turns bytes handed to the transport into whole, non-decreasing percentages.
struct Progress<F> {
    total: usize,
    sent: usize,
    last: Option<u8>,
    callback: F,
}

impl<F: FnMut(u8)> Progress<F> {
    fn new(total: usize, callback: F) -> Self {
        Self {
            total,
            sent: 0,
            last: None,
            callback,
        }
    }

    fn advance(&mut self, bytes: usize) {
        self.sent = (self.sent + bytes).min(self.total);
        let pct = percent(self.sent, self.total);
        self.report(pct);
    }

    fn finish(&mut self) {
        self.report(100);
    }

    fn report(&mut self, pct: u8) {
        if self.last.is_some_and(|last| pct <= last) {
            return;
        }
        self.last = Some(pct);
        (self.callback)(pct);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn percent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    // Rounded like a UI progress bar; `sent <= total` keeps this within 0..=100.
    ((sent as u128 * 100 + total as u128 / 2) / total as u128) as u8
}
