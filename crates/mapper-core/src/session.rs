// ── Session store ──
//
// The one place that knows who is signed in. Holds the auth view that the
// guard and the console read, and is the only writer of the auth keys in
// durable storage. The transport sees it through `SessionHandle`.

use std::sync::Arc;

use mapper_api::SessionHandle;
use mapper_api::types::{LoginResponse, TokenPair, User, UserRole};
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::route::Navigator;
use crate::storage::{AUTH_TOKEN, REFRESH_TOKEN, Storage, USER};

// ── AuthState ────────────────────────────────────────────────────────

/// Snapshot of the auth view. Tokens live only in storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    /// A login, registration or session check is in flight.
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Coarse lifecycle phase derived from [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AuthPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl AuthState {
    pub fn phase(&self) -> AuthPhase {
        if self.is_loading {
            AuthPhase::Authenticating
        } else if self.is_authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Anonymous
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// Auth state plus its durable backing.
///
/// Shared as `Arc<Session>`: the studio drives it, the transport reads the
/// bearer token from it and reports 401s to it.
pub struct Session {
    storage: Arc<dyn Storage>,
    state: watch::Sender<AuthState>,
    navigator: Navigator,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &*self.state.borrow())
            .field("location", &self.navigator.location())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Restore from storage.
    ///
    /// A stored token is not trusted on its own: the session starts in the
    /// checking state until [`bootstrap`](crate::Studio::bootstrap) confirms it.
    pub fn new(storage: Arc<dyn Storage>, navigator: Navigator) -> Self {
        let user = read_user(storage.as_ref());
        let has_token = storage.get(AUTH_TOKEN).is_some();
        let (state, _) = watch::channel(AuthState {
            user,
            is_authenticated: false,
            is_loading: has_token,
            error: None,
        });
        Self {
            storage,
            state,
            navigator,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn auth_token(&self) -> Option<SecretString> {
        self.storage.get(AUTH_TOKEN).map(SecretString::from)
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.storage.get(REFRESH_TOKEN).map(SecretString::from)
    }

    /// The user snapshot persisted at the last login or profile update.
    pub fn stored_user(&self) -> Option<User> {
        read_user(self.storage.as_ref())
    }

    // ── Token management ─────────────────────────────────────────────

    pub fn set_auth_token(&self, token: &str) {
        self.storage.set(AUTH_TOKEN, token);
    }

    pub fn remove_auth_token(&self) {
        self.storage.remove(AUTH_TOKEN);
    }

    // ── Role checks ──────────────────────────────────────────────────
    //
    // Synchronous reads of the stored snapshot; they can be stale until the
    // next session check refreshes it.

    pub fn has_role(&self, role: UserRole) -> bool {
        self.stored_user().is_some_and(|u| u.role == role)
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        self.stored_user().is_some_and(|u| roles.contains(&u.role))
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.stored_user()
            .is_some_and(|u| u.has_permission(permission))
    }

    // ── Transitions (driven by the studio) ───────────────────────────

    pub(crate) fn begin(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    pub(crate) fn establish(&self, response: &LoginResponse) {
        self.storage.set(AUTH_TOKEN, &response.token);
        self.storage.set(REFRESH_TOKEN, &response.refresh_token);
        self.persist_user(&response.user);
        self.state.send_replace(AuthState {
            user: Some(response.user.clone()),
            is_authenticated: true,
            is_loading: false,
            error: None,
        });
        debug!(username = %response.user.username, "session established");
    }

    /// Confirmed by a session check: the token is good and this is the user.
    pub(crate) fn confirm(&self, user: &User) {
        self.persist_user(user);
        self.state.send_replace(AuthState {
            user: Some(user.clone()),
            is_authenticated: true,
            is_loading: false,
            error: None,
        });
    }

    pub(crate) fn store_tokens(&self, tokens: &TokenPair) {
        self.storage.set(AUTH_TOKEN, &tokens.token);
        self.storage.set(REFRESH_TOKEN, &tokens.refresh_token);
    }

    pub(crate) fn store_user(&self, user: &User) {
        self.persist_user(user);
        self.state.send_modify(|s| s.user = Some(user.clone()));
    }

    /// A request finished without changing who is signed in.
    pub(crate) fn settle(&self) {
        self.state.send_modify(|s| s.is_loading = false);
    }

    pub(crate) fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.error = Some(message);
        });
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    /// Forget everything: tokens, user snapshot, auth view.
    pub(crate) fn clear(&self) {
        self.storage.remove(AUTH_TOKEN);
        self.storage.remove(USER);
        self.storage.remove(REFRESH_TOKEN);
        self.state.send_replace(AuthState::default());
    }

    fn persist_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(json) => self.storage.set(USER, &json),
            Err(e) => warn!(error = %e, "failed to serialize user snapshot"),
        }
    }
}

fn read_user(storage: &dyn Storage) -> Option<User> {
    let raw = storage.get(USER)?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable stored user");
            None
        }
    }
}

// ── Transport seam ───────────────────────────────────────────────────

impl SessionHandle for Session {
    fn bearer_token(&self) -> Option<SecretString> {
        self.auth_token()
    }

    /// Any 401 ends the session: both tokens go (the user snapshot stays)
    /// and the console is sent to the login page.
    fn unauthorized(&self) {
        warn!("request unauthorized, ending session");
        self.storage.remove(AUTH_TOKEN);
        self.storage.remove(REFRESH_TOKEN);
        self.state.send_modify(|s| {
            s.is_authenticated = false;
            s.is_loading = false;
        });
        self.navigator.force_login();
    }
}
