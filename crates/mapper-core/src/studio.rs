// ── Studio facade ──
//
// Owns the session, navigator, UI store, resource slices and API client
// for one console instance. Page handlers call into it; it drives the
// backend and writes results back into the stores.

use std::future::Future;
use std::sync::Arc;

use mapper_api::types::{
    ApiSchema, Device, ListQuery, Mapping, Notification, NotificationFilter, Page, ProfileUpdate,
    Service, Template, User, UserRole, YangModel,
};
use mapper_api::{ApiClient, ApiError, ApiResult, NotificationSocket};
use secrecy::SecretString;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::StudioConfig;
use crate::error::CoreError;
use crate::forms::{LoginForm, RegisterForm, validation_error};
use crate::route::{GuardDecision, Navigator, Route};
use crate::session::{AuthState, Session};
use crate::slice::{ResourceSlice, SliceState};
use crate::storage::{FileStorage, MemoryStorage, Storage};
use crate::ui::{UiAction, UiStore};

// ── Slices ───────────────────────────────────────────────────────────

/// One list slice per resource page.
#[derive(Debug)]
pub struct Slices {
    pub devices: ResourceSlice<Device>,
    pub yang_models: ResourceSlice<YangModel>,
    pub api_schemas: ResourceSlice<ApiSchema>,
    pub mappings: ResourceSlice<Mapping>,
    pub templates: ResourceSlice<Template>,
    pub services: ResourceSlice<Service>,
    pub notifications: ResourceSlice<Notification>,
}

impl Default for Slices {
    fn default() -> Self {
        Self {
            devices: ResourceSlice::new("Failed to fetch devices"),
            yang_models: ResourceSlice::new("Failed to fetch YANG models"),
            api_schemas: ResourceSlice::new("Failed to fetch API schemas"),
            mappings: ResourceSlice::new("Failed to fetch mappings"),
            templates: ResourceSlice::new("Failed to fetch templates"),
            services: ResourceSlice::new("Failed to fetch services"),
            notifications: ResourceSlice::new("Failed to fetch notifications"),
        }
    }
}

/// Headline numbers for the dashboard page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub devices: u64,
    pub yang_models: u64,
    pub services: u64,
    pub unread_notifications: u64,
}

// ── Studio ───────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<StudioInner>`.
#[derive(Clone)]
pub struct Studio {
    inner: Arc<StudioInner>,
}

struct StudioInner {
    config: StudioConfig,
    session: Arc<Session>,
    ui: UiStore,
    client: ApiClient,
    slices: Slices,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("api_url", &self.inner.config.api_url)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Build a studio, opening durable storage at `config.storage_path`
    /// (in-memory when unset).
    pub fn new(config: StudioConfig) -> Result<Self, CoreError> {
        let storage: Arc<dyn Storage> = match &config.storage_path {
            Some(path) => Arc::new(FileStorage::open(path)?),
            None => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: StudioConfig, storage: Arc<dyn Storage>) -> Result<Self, CoreError> {
        let navigator = Navigator::default();
        let session = Arc::new(Session::new(Arc::clone(&storage), navigator));
        let client = ApiClient::new(&config.api_url, &config.transport(), session.clone())?;
        let ui = UiStore::new(storage);

        Ok(Self {
            inner: Arc::new(StudioInner {
                config,
                session,
                ui,
                client,
                slices: Slices::default(),
                cancel: CancellationToken::new(),
            }),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &StudioConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    pub fn auth(&self) -> AuthState {
        self.inner.session.state()
    }

    pub fn navigator(&self) -> &Navigator {
        self.inner.session.navigator()
    }

    pub fn ui(&self) -> &UiStore {
        &self.inner.ui
    }

    pub fn slices(&self) -> &Slices {
        &self.inner.slices
    }

    /// Request a page by path; the guard decides where the console lands.
    pub fn navigate(&self, path: &str) -> GuardDecision {
        self.navigator().navigate(path, &self.auth())
    }

    // ── Auth flow ────────────────────────────────────────────────────

    /// Validate the form, sign in, and land on the dashboard.
    ///
    /// An invalid form fails with `VALIDATION_ERROR` before any request.
    pub async fn login(&self, form: &LoginForm) -> Result<User, CoreError> {
        let credentials = form.submit().map_err(|fields| validation_error(&fields))?;
        let session = &self.inner.session;

        session.begin();
        match self.inner.client.login(&credentials).await {
            Ok(response) => {
                session.establish(&response);
                self.navigate(Route::Dashboard.path());
                info!(username = %response.user.username, "signed in");
                Ok(response.user)
            }
            Err(e) => {
                session.fail(e.message.clone());
                Err(e.into())
            }
        }
    }

    /// Create an account. The session is left as it was.
    pub async fn register(&self, form: &RegisterForm) -> Result<User, CoreError> {
        let data = form.submit().map_err(|fields| validation_error(&fields))?;
        let session = &self.inner.session;

        session.begin();
        match self.inner.client.register(&data).await {
            Ok(user) => {
                session.settle();
                Ok(user)
            }
            Err(e) => {
                session.fail(e.message.clone());
                Err(e.into())
            }
        }
    }

    /// Application start: confirm a stored token against `/auth/me`.
    ///
    /// With no stored token this settles anonymous without a request. A
    /// failed check clears every auth key.
    pub async fn bootstrap(&self) -> AuthState {
        let session = &self.inner.session;
        if session.auth_token().is_none() {
            session.settle();
            return session.state();
        }

        session.begin();
        match self.inner.client.current_user().await {
            Ok(user) => {
                debug!(username = %user.username, "stored session confirmed");
                session.confirm(&user);
            }
            Err(e) => {
                warn!(code = %e.code, error = %e, "stored session rejected");
                session.clear();
            }
        }
        session.state()
    }

    /// Sign out. The backend call is best-effort; local auth state is
    /// cleared on every path out of this function.
    pub async fn logout(&self) {
        let _clear = ClearOnExit(&self.inner.session);
        if let Err(e) = self.inner.client.logout().await {
            warn!(code = %e.code, error = %e, "logout request failed");
        }
    }

    /// Trade the stored refresh token for a new pair.
    pub async fn refresh_token(&self) -> Result<(), CoreError> {
        let session = &self.inner.session;
        let Some(refresh) = session.refresh_token() else {
            return Err(ApiError::no_refresh_token().into());
        };
        let tokens = self.inner.client.refresh(&refresh).await?;
        session.store_tokens(&tokens);
        debug!("tokens refreshed");
        Ok(())
    }

    pub async fn current_user(&self) -> Result<User, CoreError> {
        Ok(self.inner.client.current_user().await?)
    }

    /// Update the profile and persist the returned snapshot.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, CoreError> {
        let user = self.inner.client.update_profile(update).await?;
        self.inner.session.store_user(&user);
        Ok(user)
    }

    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<(), CoreError> {
        Ok(self.inner.client.change_password(current, new).await?)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), CoreError> {
        Ok(self.inner.client.forgot_password(email).await?)
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &SecretString,
    ) -> Result<(), CoreError> {
        Ok(self.inner.client.reset_password(token, new_password).await?)
    }

    pub async fn verify_email(&self, token: &str) -> Result<(), CoreError> {
        Ok(self.inner.client.verify_email(token).await?)
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.inner.session.has_role(role)
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        self.inner.session.has_any_role(roles)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.inner.session.has_permission(permission)
    }

    // ── Resource lists ───────────────────────────────────────────────

    pub async fn fetch_devices(&self, query: &ListQuery) -> Result<SliceState<Device>, CoreError> {
        let slice = &self.inner.slices.devices;
        fill(slice, self.inner.client.list_devices(query)).await
    }

    pub async fn fetch_yang_models(
        &self,
        query: &ListQuery,
    ) -> Result<SliceState<YangModel>, CoreError> {
        let slice = &self.inner.slices.yang_models;
        fill(slice, self.inner.client.list_yang_models(query)).await
    }

    pub async fn fetch_api_schemas(
        &self,
        query: &ListQuery,
    ) -> Result<SliceState<ApiSchema>, CoreError> {
        let slice = &self.inner.slices.api_schemas;
        fill(slice, self.inner.client.list_api_schemas(query)).await
    }

    pub async fn fetch_mappings(&self, query: &ListQuery) -> Result<SliceState<Mapping>, CoreError> {
        let slice = &self.inner.slices.mappings;
        fill(slice, self.inner.client.list_mappings(query)).await
    }

    pub async fn fetch_templates(
        &self,
        query: &ListQuery,
    ) -> Result<SliceState<Template>, CoreError> {
        let slice = &self.inner.slices.templates;
        fill(slice, self.inner.client.list_templates(query)).await
    }

    pub async fn fetch_services(&self, query: &ListQuery) -> Result<SliceState<Service>, CoreError> {
        let slice = &self.inner.slices.services;
        fill(slice, self.inner.client.list_services(query)).await
    }

    /// Fetch notifications; the unread count also lands in the UI store.
    pub async fn fetch_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> Result<SliceState<Notification>, CoreError> {
        let client = &self.inner.client;
        let ui = &self.inner.ui;
        let fetch = async {
            let page = client.list_notifications(filter).await?;
            ui.dispatch(UiAction::SetUnreadNotificationCount(page.unread_count));
            Ok::<_, ApiError>(Page {
                items: page.notifications,
                pagination: page.pagination,
            })
        };
        fill(&self.inner.slices.notifications, fetch).await
    }

    /// Totals for the dashboard, fetched concurrently.
    pub async fn dashboard(&self) -> Result<DashboardSummary, CoreError> {
        let client = &self.inner.client;
        let probe = ListQuery::new(1, 1);
        let (devices, models, services, unread) = tokio::try_join!(
            client.list_devices(&probe),
            client.list_yang_models(&probe),
            client.list_services(&probe),
            client.unread_notification_count(),
        )?;
        self.inner
            .ui
            .dispatch(UiAction::SetUnreadNotificationCount(unread.count));
        Ok(DashboardSummary {
            devices: devices.pagination.total,
            yang_models: models.pagination.total,
            services: services.pagination.total,
            unread_notifications: unread.count,
        })
    }

    // ── Live updates ─────────────────────────────────────────────────

    /// Open the notification socket and forward every notification to
    /// `callback` from a background task.
    ///
    /// Fails with `NO_AUTH_TOKEN` when no token is stored. The task ends
    /// when the socket closes or [`shutdown`](Self::shutdown) is called.
    pub fn subscribe_to_updates<F>(&self, mut callback: F) -> Result<JoinHandle<()>, CoreError>
    where
        F: FnMut(Arc<Notification>) + Send + 'static,
    {
        let token = self.inner.session.auth_token();
        let socket = NotificationSocket::connect(
            &self.inner.config.ws_url,
            token.as_ref(),
            self.inner.config.reconnect.clone(),
            self.inner.cancel.child_token(),
        )?;

        Ok(tokio::spawn(async move {
            let mut rx = socket.subscribe();
            loop {
                match rx.recv().await {
                    Ok(notification) => callback(notification),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "notification consumer lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            socket.shutdown();
            debug!("notification updates ended");
        }))
    }

    /// Stop background tasks (notification socket).
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }
}

/// Run one list fetch through a slice. Last to resolve wins.
async fn fill<T, Fut>(slice: &ResourceSlice<T>, fetch: Fut) -> Result<SliceState<T>, CoreError>
where
    T: Clone + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<Page<T>>>,
{
    slice.begin();
    match fetch.await {
        Ok(page) => {
            slice.fulfil(page);
            Ok(slice.state())
        }
        Err(e) => {
            slice.reject(&e.message);
            Err(e.into())
        }
    }
}

/// Clears the session when dropped, including on early return or panic.
struct ClearOnExit<'a>(&'a Session);

impl Drop for ClearOnExit<'_> {
    fn drop(&mut self) {
        self.0.clear();
        self.0.navigator().force_login();
    }
}
