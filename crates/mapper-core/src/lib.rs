//! Session lifecycle and client-side state between `mapper-api` and the console.
//!
//! This crate owns everything the console keeps in memory or on disk
//! between requests:
//!
//! - **[`Studio`]**: Central facade. Drives sign-in, the startup session
//!   check, sign-out and token refresh, fills the per-resource
//!   [`ResourceSlice`]s, and forwards live notifications.
//!
//! - **[`Session`]**: The authenticated user and the `is_loading` / `error`
//!   flags, observable through a `watch` channel. It is the only writer of
//!   the auth keys in [`Storage`] and the [`SessionHandle`](mapper_api::SessionHandle)
//!   the HTTP client reports 401s to.
//!
//! - **[`route`]**: [`Route`], the [`guard`] that decides between render,
//!   wait and redirect, and the [`Navigator`] that records the location.
//!
//! - **[`UiStore`]**: Reducer over [`UiAction`] for sidebar, theme, modals,
//!   filters and the rest of the presentation state.
//!
//! - **[`forms`]**: Login and registration validation that never reaches
//!   the network.

pub mod config;
pub mod error;
pub mod forms;
pub mod route;
pub mod session;
pub mod slice;
pub mod storage;
pub mod studio;
pub mod ui;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::StudioConfig;
pub use error::CoreError;
pub use forms::{FieldErrors, LoginForm, RegisterForm};
pub use route::{GuardDecision, Navigator, Route, guard};
pub use session::{AuthPhase, AuthState, Session};
pub use slice::{ResourceSlice, SliceState};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use studio::{DashboardSummary, Slices, Studio};
pub use ui::{Breadcrumb, Theme, UiAction, UiState, UiStore};
