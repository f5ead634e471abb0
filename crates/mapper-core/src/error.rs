// ── Core error types ──
//
// Failures from mapper-core. Request failures keep their normalized
// `ApiError` shape so callers can still inspect the code, status and
// details; everything else is a local concern (storage, configuration).

use std::path::PathBuf;

use mapper_api::{ApiError, ErrorKind};
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Request errors ───────────────────────────────────────────────
    /// A backend call failed, or a form was rejected before sending.
    #[error(transparent)]
    Api(#[from] ApiError),

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Storage error at {}: {message}", path.display())]
    Storage { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<mapper_api::Error> for CoreError {
    fn from(err: mapper_api::Error) -> Self {
        CoreError::Config {
            message: err.to_string(),
        }
    }
}

impl CoreError {
    /// The wrapped request error, if this came from the backend or a form.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            CoreError::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Machine-readable code: the `ApiError` code, or a fixed local code.
    pub fn code(&self) -> &str {
        match self {
            CoreError::Api(err) => &err.code,
            CoreError::Storage { .. } => "STORAGE_ERROR",
            CoreError::Config { .. } => "CONFIG_ERROR",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.api(), Some(err) if err.kind == ErrorKind::Validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_pass_through_untouched() {
        let err = CoreError::from(ApiError::server(409, "Device name already exists", None));
        assert_eq!(err.to_string(), "Device name already exists");
        assert_eq!(err.code(), "409");
        assert_eq!(err.api().and_then(ApiError::status), Some(409));
    }

    #[test]
    fn local_errors_have_fixed_codes() {
        let err = CoreError::Storage {
            path: PathBuf::from("/tmp/storage.json"),
            message: "permission denied".into(),
        };
        assert_eq!(err.code(), "STORAGE_ERROR");
        assert!(err.api().is_none());
        assert!(!err.is_validation());
    }
}
