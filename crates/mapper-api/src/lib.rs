// mapper-api: Async Rust client for the Mapper network automation backend

pub mod client;
pub mod error;
mod resources;
pub mod session;
pub mod socket;
pub mod transport;
pub mod types;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::{ApiError, ApiResult, Error, ErrorKind};
pub use session::{Anonymous, SessionHandle};
pub use socket::{DEFAULT_WS_URL, NotificationSocket, ReconnectConfig};
pub use transport::{TlsMode, TransportConfig};
