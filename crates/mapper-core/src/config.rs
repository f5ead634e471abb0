// ── Runtime studio configuration ──
//
// Where the backend lives and how to reach it. The CLI builds a
// `StudioConfig` from its profile and flags and hands it in; core never
// reads configuration files.

use std::path::PathBuf;
use std::time::Duration;

use mapper_api::transport::DEFAULT_TIMEOUT;
use mapper_api::{DEFAULT_API_URL, DEFAULT_WS_URL, ReconnectConfig, TlsMode, TransportConfig};

/// Configuration for one studio session against one backend.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// REST base URL (e.g., `http://localhost:8000/api`).
    pub api_url: String,
    /// Notification socket base URL (e.g., `ws://localhost:8000/ws`).
    pub ws_url: String,
    /// TLS verification strategy.
    pub tls: TlsMode,
    /// Request timeout.
    pub timeout: Duration,
    /// Socket reconnection policy. Disabled unless asked for.
    pub reconnect: ReconnectConfig,
    /// Durable storage file. `None` keeps state in memory only.
    pub storage_path: Option<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            ws_url: DEFAULT_WS_URL.into(),
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
            reconnect: ReconnectConfig::disabled(),
            storage_path: None,
        }
    }
}

impl StudioConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_timeout(self.timeout)
            .with_tls(self.tls.clone())
    }
}
