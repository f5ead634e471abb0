//! Wire types for the Mapper backend.
//!
//! Field names are camelCase on the wire. Every enumerated field is a closed
//! Rust enum, so a payload carrying an unknown variant or a missing required
//! field fails to decode instead of flowing through untyped. Genuinely
//! open-ended fields (test data, environment maps, metadata) stay
//! `serde_json::Value`.

mod api_schema;
mod auth;
mod common;
mod device;
mod mapping;
mod notification;
mod service;
mod template;
mod yang;

pub use api_schema::*;
pub use auth::*;
pub use common::*;
pub use device::*;
pub use mapping::*;
pub use notification::*;
pub use service::*;
pub use template::*;
pub use yang::*;
