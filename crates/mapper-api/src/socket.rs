//! Live notification stream over WebSocket.
//!
//! Connects to `{ws_base}/notifications?token=<access token>` and fans each
//! decoded [`Notification`] out through a [`tokio::sync::broadcast`] channel.
//! Frames that are not valid notifications are logged and dropped.
//!
//! Reconnection is off unless asked for: [`ReconnectConfig::disabled`] is the
//! default, and the backoff loop only runs with a config that allows retries.
//!
//! ```rust,ignore
//! use mapper_api::socket::{NotificationSocket, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let socket = NotificationSocket::connect(
//!     "ws://localhost:8000/ws",
//!     Some(&token),
//!     ReconnectConfig::default(),
//!     CancellationToken::new(),
//! )?;
//! let mut rx = socket.subscribe();
//! while let Ok(n) = rx.recv().await {
//!     println!("[{}] {}", n.severity, n.title);
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::types::Notification;

/// Default socket base for local development.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

const NOTIFICATION_CHANNEL_CAPACITY: usize = 256;

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff settings for the socket loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// `None` retries forever; `Some(0)` never reconnects.
    pub max_retries: Option<u32>,
}

impl ReconnectConfig {
    /// One connection attempt; the task ends when the socket closes.
    pub fn disabled() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: Some(0),
        }
    }

    /// Retry forever with 1s..30s backoff.
    pub fn forever() -> Self {
        Self {
            max_retries: None,
            ..Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_retries != Some(0)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

// ── NotificationSocket ───────────────────────────────────────────────

/// Handle to a running notification stream.
///
/// The background task stops when the cancellation token fires, when
/// [`shutdown`](Self::shutdown) is called, or when the connection ends and
/// reconnection is disabled.
pub struct NotificationSocket {
    rx: broadcast::Receiver<Arc<Notification>>,
    cancel: CancellationToken,
}

impl NotificationSocket {
    /// Spawn the socket task. Must be called inside a tokio runtime.
    ///
    /// Fails with `NO_AUTH_TOKEN` when no access token is available, and
    /// with `UNKNOWN_ERROR` when `ws_base` is not a valid URL. Connection
    /// failures after that are logged by the task, not returned.
    pub fn connect(
        ws_base: &str,
        token: Option<&SecretString>,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> ApiResult<Self> {
        let Some(token) = token else {
            error!("no auth token available for notification updates");
            return Err(ApiError::no_auth_token());
        };

        let url = notifications_url(ws_base, token)?;
        let (tx, rx) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            socket_loop(url, tx, reconnect, task_cancel).await;
        });

        Ok(Self { rx, cancel })
    }

    /// A new receiver. Slow consumers see `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.rx.resubscribe()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

fn notifications_url(ws_base: &str, token: &SecretString) -> ApiResult<Url> {
    let raw = format!("{}/notifications", ws_base.trim_end_matches('/'));
    let mut url = Url::parse(&raw)
        .map_err(|e| ApiError::unknown(format!("invalid notification socket URL '{raw}': {e}")))?;
    url.query_pairs_mut()
        .append_pair("token", token.expose_secret());
    Ok(url)
}

// ── Background loop ──────────────────────────────────────────────────

async fn socket_loop(
    url: Url,
    tx: broadcast::Sender<Arc<Notification>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, &tx, &cancel) => result,
        };

        match result {
            Ok(()) if cancel.is_cancelled() => break,
            Ok(()) => {
                info!("disconnected from notification updates");
                if !reconnect.is_enabled() {
                    break;
                }
                attempt = 0;
            }
            Err(e) => {
                warn!(error = %e, attempt, "notification socket error");

                if let Some(max) = reconnect.max_retries {
                    if attempt >= max {
                        if reconnect.is_enabled() {
                            error!(max_retries = max, "notification socket retry limit reached");
                        }
                        break;
                    }
                }

                let delay = calculate_backoff(attempt, &reconnect);
                debug!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    attempt,
                    "waiting before reconnect"
                );

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }

                attempt = attempt.saturating_add(1);
            }
        }
    }

    debug!("notification socket task exiting");
}

/// One connection: open, read frames until close, error or cancellation.
async fn connect_and_read(
    url: &Url,
    tx: &broadcast::Sender<Arc<Notification>>,
    cancel: &CancellationToken,
) -> Result<(), tungstenite::Error> {
    let (stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
    info!("connected to notification updates");

    let (_write, mut read) = stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => match frame {
                Some(Ok(tungstenite::Message::Text(text))) => parse_and_broadcast(&text, tx),
                Some(Ok(tungstenite::Message::Ping(_))) => trace!("notification socket ping"),
                Some(Ok(tungstenite::Message::Close(frame))) => {
                    if let Some(cf) = frame {
                        debug!(code = %cf.code, reason = %cf.reason, "close frame received");
                    }
                    return Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            },
        }
    }
}

// ── Frame decoding ───────────────────────────────────────────────────

/// Decode one text frame and broadcast it. Undecodable frames are skipped.
fn parse_and_broadcast(text: &str, tx: &broadcast::Sender<Arc<Notification>>) {
    match serde_json::from_str::<Notification>(text) {
        Ok(notification) => {
            trace!(id = %notification.id, "notification received");
            // No subscribers right now is not an error.
            let _ = tx.send(Arc::new(notification));
        }
        Err(e) => debug!(error = %e, "error parsing notification update"),
    }
}

// ── Backoff ──────────────────────────────────────────────────────────

/// `min(initial * 2^attempt, max)` with a deterministic +-25% jitter.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    let jitter = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    Duration::from_secs_f64((capped * jitter).max(0.0))
}
