//! CLI error types with miette diagnostics.
//!
//! Every request failure arrives as a normalized `ApiError`; this module
//! turns it into a one-line banner with a help hint and an exit code.

use miette::Diagnostic;
use thiserror::Error;

use mapper_api::{ApiError, ErrorKind};
use mapper_config::ConfigError;
use mapper_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Requests ─────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(mapper::request))]
    Request {
        message: String,
        status: Option<u16>,
        kind: ErrorKind,
        #[help]
        hint: Option<String>,
    },

    #[error("{}", .lines.join("\n"))]
    #[diagnostic(
        code(mapper::validation),
        help("Correct the fields above and try again.")
    )]
    Validation { lines: Vec<String> },

    // ── Session ──────────────────────────────────────────────────────
    #[error("Not signed in")]
    #[diagnostic(code(mapper::not_signed_in), help("Run: mapper login"))]
    NotSignedIn,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(mapper::no_credentials),
        help(
            "Pass --username and enter the password when prompted,\n\
             or store one with: mapper config set-password --profile {profile}"
        )
    )]
    NoCredentials { profile: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mapper::invalid_value))]
    InvalidValue { field: String, reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(mapper::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: mapper config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(mapper::config))]
    Config(ConfigError),

    #[error("Local session storage is unusable: {message}")]
    #[diagnostic(
        code(mapper::storage),
        help("Remove or repair {path} and sign in again.")
    )]
    Storage { path: String, message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(mapper::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(mapper::prompt))]
    Prompt(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("Could not read {path}: {source}")]
    #[diagnostic(code(mapper::io))]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(mapper::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(mapper::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Request { kind, status, .. } => match (kind, status) {
                (ErrorKind::Network { timed_out: true }, _) => exit_code::TIMEOUT,
                (ErrorKind::Network { .. }, _) => exit_code::CONNECTION,
                (ErrorKind::NoAuthToken | ErrorKind::NoRefreshToken, _) | (_, Some(401)) => {
                    exit_code::AUTH
                }
                (_, Some(403)) => exit_code::PERMISSION,
                (_, Some(404)) => exit_code::NOT_FOUND,
                (_, Some(409)) => exit_code::CONFLICT,
                _ => exit_code::GENERAL,
            },
            Self::NotSignedIn | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Validation { .. }
            | Self::InvalidValue { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ApiError → CliError mapping ──────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        if err.kind == ErrorKind::Validation {
            return Self::Validation {
                lines: field_lines(err.details.as_ref()),
            };
        }

        let hint = match err.kind {
            ErrorKind::Server { status: 401 } | ErrorKind::NoRefreshToken => {
                Some("Your session has ended. Run: mapper login".to_owned())
            }
            ErrorKind::Server { status: 403 } => {
                Some("Your role does not allow this operation.".to_owned())
            }
            ErrorKind::Network { timed_out: true } => {
                Some("Increase the timeout with --timeout or check the backend.".to_owned())
            }
            ErrorKind::Network { .. } => Some(
                "Check that the backend is reachable (--api-url) and that TLS settings match."
                    .to_owned(),
            ),
            ErrorKind::MalformedResponse => err
                .details
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .map(|body| format!("Response began with: {body}")),
            _ => None,
        };

        Self::Request {
            status: err.status(),
            message: err.message,
            kind: err.kind,
            hint,
        }
    }
}

/// `field: message` lines from a validation error's details object.
fn field_lines(details: Option<&serde_json::Value>) -> Vec<String> {
    let lines: Vec<String> = details
        .and_then(serde_json::Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .map(|(field, msg)| match msg.as_str() {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: {msg}"),
                })
                .collect()
        })
        .unwrap_or_default();

    if lines.is_empty() {
        vec!["Validation failed".to_owned()]
    } else {
        lines
    }
}

// ── CoreError / ConfigError → CliError mapping ───────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(api) => api.into(),
            CoreError::Storage { path, message } => Self::Storage {
                path: path.display().to_string(),
                message,
            },
            CoreError::Config { message } => Self::InvalidValue {
                field: "configuration".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::InvalidValue { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            other => Self::Config(other),
        }
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}
