use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failures while constructing a client, before any request exists.
#[derive(Debug, Error)]
pub enum Error {
    /// Base URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),
}

// ── Request-level error ─────────────────────────────────────────────

/// Result of every request issued through [`ApiClient`](crate::ApiClient).
pub type ApiResult<T> = Result<T, ApiError>;

pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NO_REFRESH_TOKEN: &str = "NO_REFRESH_TOKEN";
pub const NO_AUTH_TOKEN: &str = "NO_AUTH_TOKEN";

const NETWORK_MESSAGE: &str = "Network error occurred. Please check your connection.";

/// Which side of the request a failure came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ErrorKind {
    /// A response arrived with a non-2xx status.
    Server { status: u16 },
    /// The request went out but no response came back.
    Network { timed_out: bool },
    /// A 2xx response whose body did not match the expected shape.
    MalformedResponse,
    /// Client-side form validation; never reaches the network.
    Validation,
    /// Token refresh requested with no refresh token stored.
    NoRefreshToken,
    /// Socket subscription requested with no access token stored.
    NoAuthToken,
    /// Anything else, including failures before the request was sent.
    Unknown,
}

/// Normalized request failure.
///
/// Every call site receives this shape regardless of whether the server,
/// the network, or the client itself produced the failure.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    #[serde(flatten)]
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Non-2xx response. `code` is the status rendered as a string.
    pub fn server(status: u16, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            details,
            ..Self::new(ErrorKind::Server { status }, status.to_string(), message)
        }
    }

    pub fn network(timed_out: bool) -> Self {
        Self::new(ErrorKind::Network { timed_out }, NETWORK_ERROR, NETWORK_MESSAGE)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, UNKNOWN_ERROR, message)
    }

    pub fn malformed(message: impl Into<String>, body: &str) -> Self {
        let preview: String = body.chars().take(200).collect();
        Self::new(ErrorKind::MalformedResponse, INVALID_RESPONSE, message)
            .with_details(Value::String(preview))
    }

    /// Client-side validation failure; `fields` maps field names to messages.
    pub fn validation(fields: Value) -> Self {
        Self::new(ErrorKind::Validation, VALIDATION_ERROR, "Validation failed").with_details(fields)
    }

    pub fn no_refresh_token() -> Self {
        Self::new(
            ErrorKind::NoRefreshToken,
            NO_REFRESH_TOKEN,
            "No refresh token available",
        )
    }

    pub fn no_auth_token() -> Self {
        Self::new(
            ErrorKind::NoAuthToken,
            NO_AUTH_TOKEN,
            "No auth token available for notification updates",
        )
    }

    /// Classify a transport failure from reqwest.
    ///
    /// Builder errors happen before anything is sent and count as unknown;
    /// everything else means the request left but no usable response came back.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::unknown(err.to_string());
        }
        Self::network(err.is_timeout()).with_details(Value::String(err.to_string()))
    }

    // ── Predicates ──────────────────────────────────────────────────

    /// HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ErrorKind::Server { status } => Some(status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    pub fn is_network(&self) -> bool {
        matches!(self.kind, ErrorKind::Network { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Network { timed_out: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_uses_status_as_code() {
        let err = ApiError::server(404, "Device not found", None);
        assert_eq!(err.code, "404");
        assert!(err.is_not_found());
        assert!(!err.is_network());
    }

    #[test]
    fn network_error_carries_fixed_message() {
        let err = ApiError::network(true);
        assert_eq!(err.code, NETWORK_ERROR);
        assert_eq!(
            err.message,
            "Network error occurred. Please check your connection."
        );
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn malformed_body_preview_is_truncated() {
        let body = "x".repeat(500);
        let err = ApiError::malformed("missing field `id`", &body);
        assert_eq!(err.code, INVALID_RESPONSE);
        let preview = err.details.as_ref().and_then(Value::as_str).map(str::len);
        assert_eq!(preview, Some(200));
    }

    #[test]
    fn serialized_shape_is_flat() {
        let err = ApiError::no_refresh_token();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "no_refresh_token");
        assert_eq!(json["code"], "NO_REFRESH_TOKEN");
        assert_eq!(json["message"], "No refresh token available");
        assert!(json.get("details").is_none());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn variant_fields_use_camel_case_keys() {
        let json = serde_json::to_value(ApiError::network(true)).unwrap();
        assert_eq!(json["kind"], "network");
        assert_eq!(json["timedOut"], true);
        assert!(json.get("timed_out").is_none());

        let back: ApiError = serde_json::from_value(json).unwrap();
        assert!(back.is_timeout());
    }
}
