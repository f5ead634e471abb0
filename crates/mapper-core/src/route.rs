// ── Routes and the access guard ──
//
// Every page of the console is a `Route`. The guard decides, from the
// current auth view alone, whether a route renders, waits, or redirects.
// `Navigator` records where the console currently is.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::session::AuthState;

/// A console page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    /// `/`, which only ever redirects.
    Index,
    Dashboard,
    Devices,
    YangModels,
    ApiSchemas,
    Mappings,
    Templates,
    Services,
    Profile,
    NotFound,
}

impl Route {
    /// Every named route, in menu order.
    pub const ALL: [Route; 11] = [
        Route::Index,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Devices,
        Route::YangModels,
        Route::ApiSchemas,
        Route::Mappings,
        Route::Templates,
        Route::Services,
        Route::Profile,
    ];

    /// Resolve a path. Sub-paths (`/devices/42`) resolve to their section.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Route::Index;
        }
        let section = trimmed.split('/').next().unwrap_or_default();
        let is_leaf = !trimmed.contains('/');

        match section {
            "login" if is_leaf => Route::Login,
            "register" if is_leaf => Route::Register,
            "dashboard" if is_leaf => Route::Dashboard,
            "profile" if is_leaf => Route::Profile,
            "devices" => Route::Devices,
            "yang-models" => Route::YangModels,
            "api-schemas" => Route::ApiSchemas,
            "mappings" => Route::Mappings,
            "templates" => Route::Templates,
            "services" => Route::Services,
            _ => Route::NotFound,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Index => "/",
            Route::Dashboard => "/dashboard",
            Route::Devices => "/devices",
            Route::YangModels => "/yang-models",
            Route::ApiSchemas => "/api-schemas",
            Route::Mappings => "/mappings",
            Route::Templates => "/templates",
            Route::Services => "/services",
            Route::Profile => "/profile",
            Route::NotFound => "/404",
        }
    }

    /// Routes that require an authenticated session.
    pub fn is_protected(self) -> bool {
        !matches!(self, Route::Login | Route::Register | Route::NotFound)
    }

    /// Login and register: bounced to the dashboard once signed in.
    pub fn is_public_only(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// ── Guard ────────────────────────────────────────────────────────────

/// Outcome of asking the guard whether a route may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session check is still in flight. Show a spinner, decide later.
    Loading,
    Allow,
    Redirect(Route),
}

/// Decide access to `route` for the given auth view.
///
/// The original location is never remembered: after a redirect to the
/// login page, a successful login lands on the dashboard.
pub fn guard(route: Route, auth: &AuthState) -> GuardDecision {
    if auth.is_loading {
        return GuardDecision::Loading;
    }

    match route {
        Route::Index if auth.is_authenticated => GuardDecision::Redirect(Route::Dashboard),
        r if r.is_public_only() && auth.is_authenticated => {
            GuardDecision::Redirect(Route::Dashboard)
        }
        r if r.is_protected() && !auth.is_authenticated => GuardDecision::Redirect(Route::Login),
        _ => GuardDecision::Allow,
    }
}

// ── Navigator ────────────────────────────────────────────────────────

/// Current console location, observable through a `watch` channel.
///
/// Cheap to clone; all clones share the same location.
#[derive(Debug, Clone)]
pub struct Navigator {
    location: Arc<watch::Sender<Route>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Index)
    }
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        let (tx, _) = watch::channel(start);
        Self {
            location: Arc::new(tx),
        }
    }

    /// Request `path`, apply the guard, and record where the console ends up.
    ///
    /// `Loading` leaves the location unchanged.
    pub fn navigate(&self, path: &str, auth: &AuthState) -> GuardDecision {
        let requested = Route::parse(path);
        let decision = guard(requested, auth);
        match decision {
            GuardDecision::Loading => {}
            GuardDecision::Allow => self.go(requested),
            GuardDecision::Redirect(target) => self.go(target),
        }
        debug!(%requested, ?decision, location = %self.location(), "navigate");
        decision
    }

    /// Unconditional replace-navigation to the login page.
    pub fn force_login(&self) {
        self.go(Route::Login);
    }

    pub fn location(&self) -> Route {
        *self.location.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.location.subscribe()
    }

    fn go(&self, route: Route) {
        self.location.send_replace(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> AuthState {
        AuthState {
            is_authenticated: true,
            ..AuthState::default()
        }
    }

    fn checking() -> AuthState {
        AuthState {
            is_loading: true,
            ..AuthState::default()
        }
    }

    #[test]
    fn sub_paths_resolve_to_their_section() {
        assert_eq!(Route::parse("/devices/42"), Route::Devices);
        assert_eq!(Route::parse("/yang-models/abc/tree"), Route::YangModels);
        assert_eq!(Route::parse("/"), Route::Index);
        assert_eq!(Route::parse(""), Route::Index);
        assert_eq!(Route::parse("/login?next=x"), Route::Login);
        assert_eq!(Route::parse("/login/extra"), Route::NotFound);
        assert_eq!(Route::parse("/nope"), Route::NotFound);
    }

    #[test]
    fn every_named_route_round_trips() {
        for route in Route::ALL {
            assert_eq!(Route::parse(route.path()), route);
        }
    }

    #[test]
    fn protected_routes_redirect_to_login_when_signed_out() {
        let anon = AuthState::default();
        assert_eq!(
            guard(Route::Dashboard, &anon),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(
            guard(Route::Services, &anon),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(guard(Route::Login, &anon), GuardDecision::Allow);
        assert_eq!(guard(Route::Register, &anon), GuardDecision::Allow);
        assert_eq!(guard(Route::NotFound, &anon), GuardDecision::Allow);
    }

    #[test]
    fn public_only_routes_redirect_to_dashboard_when_signed_in() {
        let auth = signed_in();
        assert_eq!(
            guard(Route::Login, &auth),
            GuardDecision::Redirect(Route::Dashboard)
        );
        assert_eq!(
            guard(Route::Register, &auth),
            GuardDecision::Redirect(Route::Dashboard)
        );
        assert_eq!(
            guard(Route::Index, &auth),
            GuardDecision::Redirect(Route::Dashboard)
        );
        assert_eq!(guard(Route::Devices, &auth), GuardDecision::Allow);
    }

    #[test]
    fn loading_defers_every_route() {
        let auth = checking();
        for route in Route::ALL {
            assert_eq!(guard(route, &auth), GuardDecision::Loading);
        }
        assert_eq!(guard(Route::NotFound, &auth), GuardDecision::Loading);
    }

    #[test]
    fn navigator_records_guarded_location() {
        let nav = Navigator::default();
        let anon = AuthState::default();

        assert_eq!(
            nav.navigate("/dashboard", &anon),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(nav.location(), Route::Login);

        nav.navigate("/", &anon);
        assert_eq!(nav.location(), Route::Login);

        nav.navigate("/", &signed_in());
        assert_eq!(nav.location(), Route::Dashboard);

        nav.navigate("/devices/7", &checking());
        assert_eq!(nav.location(), Route::Dashboard);
    }

    #[test]
    fn force_login_notifies_subscribers() {
        let nav = Navigator::new(Route::Devices);
        let mut rx = nav.subscribe();
        nav.force_login();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Route::Login);
    }
}
