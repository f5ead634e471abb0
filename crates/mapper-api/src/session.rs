// Seam between the transport and whoever owns the session.
//
// The client never touches storage or navigation. It asks the handle for
// the current bearer token before each request and reports every 401 back
// through `unauthorized()`; the owner decides what teardown means.

use secrecy::SecretString;

/// Session owner as seen by [`ApiClient`](crate::ApiClient).
pub trait SessionHandle: Send + Sync {
    /// Token to attach as `Authorization: Bearer <token>`, if any.
    fn bearer_token(&self) -> Option<SecretString>;

    /// Called once for every response carrying HTTP 401.
    fn unauthorized(&self);
}

/// A session that never has a token. Used for unauthenticated tooling.
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl SessionHandle for Anonymous {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }

    fn unauthorized(&self) {}
}
