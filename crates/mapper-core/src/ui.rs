// ── UI state store ──
//
// Presentation state shared across pages: sidebar, theme, loading flags,
// modals, notification panel, breadcrumbs, page title, filters and
// per-key errors. A synchronous reducer over `UiAction`; every dispatch
// runs to completion before the next. Sidebar and theme survive restarts.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tokio::sync::watch;

use crate::storage::{SIDEBAR_COLLAPSED, Storage, THEME};

pub const APP_NAME: &str = "Mapper Design Studio";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalState {
    pub is_open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Breadcrumb {
    pub fn new(label: impl Into<String>, path: Option<&str>) -> Self {
        Self {
            label: label.into(),
            path: path.map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingState {
    pub global: bool,
    pub components: IndexMap<String, bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPanel {
    pub show: bool,
    pub unread_count: u64,
}

/// Everything the presentation layer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub sidebar_collapsed: bool,
    pub theme: Theme,
    pub loading: LoadingState,
    pub modals: IndexMap<String, ModalState>,
    pub notifications: NotificationPanel,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub page_title: String,
    pub filters: IndexMap<String, Value>,
    pub errors: IndexMap<String, Option<String>>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_collapsed: false,
            theme: Theme::Light,
            loading: LoadingState::default(),
            modals: IndexMap::new(),
            notifications: NotificationPanel::default(),
            breadcrumbs: Vec::new(),
            page_title: APP_NAME.into(),
            filters: IndexMap::new(),
            errors: IndexMap::new(),
        }
    }
}

impl UiState {
    /// Window title mirror of the page title.
    pub fn window_title(&self) -> String {
        format!("{} - {APP_NAME}", self.page_title)
    }

    pub fn is_modal_open(&self, modal: &str) -> bool {
        self.modals.get(modal).is_some_and(|m| m.is_open)
    }

    pub fn is_component_loading(&self, component: &str) -> bool {
        self.loading.components.get(component).copied().unwrap_or(false)
    }
}

// ── Actions ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    ToggleSidebar,
    SetSidebarCollapsed(bool),
    SetTheme(Theme),
    SetGlobalLoading(bool),
    SetComponentLoading { component: String, loading: bool },
    OpenModal { modal: String, data: Option<Value> },
    CloseModal(String),
    CloseAllModals,
    SetNotificationsVisible(bool),
    SetUnreadNotificationCount(u64),
    SetBreadcrumbs(Vec<Breadcrumb>),
    SetPageTitle(String),
    SetFilter { key: String, value: Value },
    ClearFilter(String),
    ClearAllFilters,
    SetError { key: String, error: Option<String> },
    ClearError(String),
    ClearAllErrors,
}

// ── Store ────────────────────────────────────────────────────────────

pub struct UiStore {
    storage: Arc<dyn Storage>,
    state: watch::Sender<UiState>,
}

impl std::fmt::Debug for UiStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl UiStore {
    /// Restore sidebar and theme from storage; everything else starts fresh.
    ///
    /// Only the exact string `"true"` collapses the sidebar, and an
    /// unrecognized theme falls back to light.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let sidebar_collapsed = storage.get(SIDEBAR_COLLAPSED).as_deref() == Some("true");
        let theme = storage
            .get(THEME)
            .and_then(|t| t.parse().ok())
            .unwrap_or_default();
        let (state, _) = watch::channel(UiState {
            sidebar_collapsed,
            theme,
            ..UiState::default()
        });
        Self { storage, state }
    }

    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    pub fn dispatch(&self, action: UiAction) {
        let mut persist: Option<(&'static str, String)> = None;

        self.state.send_modify(|s| match action {
            UiAction::ToggleSidebar => {
                s.sidebar_collapsed = !s.sidebar_collapsed;
                persist = Some((SIDEBAR_COLLAPSED, s.sidebar_collapsed.to_string()));
            }
            UiAction::SetSidebarCollapsed(collapsed) => {
                s.sidebar_collapsed = collapsed;
                persist = Some((SIDEBAR_COLLAPSED, collapsed.to_string()));
            }
            UiAction::SetTheme(theme) => {
                s.theme = theme;
                persist = Some((THEME, theme.to_string()));
            }
            UiAction::SetGlobalLoading(loading) => s.loading.global = loading,
            UiAction::SetComponentLoading { component, loading } => {
                s.loading.components.insert(component, loading);
            }
            UiAction::OpenModal { modal, data } => {
                s.modals.insert(
                    modal,
                    ModalState {
                        is_open: true,
                        data,
                    },
                );
            }
            UiAction::CloseModal(modal) => {
                s.modals.insert(modal, ModalState::default());
            }
            UiAction::CloseAllModals => {
                for m in s.modals.values_mut() {
                    *m = ModalState::default();
                }
            }
            UiAction::SetNotificationsVisible(show) => s.notifications.show = show,
            UiAction::SetUnreadNotificationCount(count) => s.notifications.unread_count = count,
            UiAction::SetBreadcrumbs(crumbs) => s.breadcrumbs = crumbs,
            UiAction::SetPageTitle(title) => s.page_title = title,
            UiAction::SetFilter { key, value } => {
                s.filters.insert(key, value);
            }
            UiAction::ClearFilter(key) => {
                s.filters.shift_remove(&key);
            }
            UiAction::ClearAllFilters => s.filters.clear(),
            UiAction::SetError { key, error } => {
                s.errors.insert(key, error);
            }
            UiAction::ClearError(key) => {
                s.errors.shift_remove(&key);
            }
            UiAction::ClearAllErrors => s.errors.clear(),
        });

        if let Some((key, value)) = persist {
            self.storage.set(key, &value);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStorage;

    fn store_with(entries: &[(&str, &str)]) -> (UiStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::with_entries(entries.iter().copied()));
        (UiStore::new(storage.clone()), storage)
    }

    #[test]
    fn initial_state_reads_persisted_preferences() {
        let (store, _) = store_with(&[(SIDEBAR_COLLAPSED, "true"), (THEME, "dark")]);
        let state = store.state();
        assert!(state.sidebar_collapsed);
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.page_title, "Mapper Design Studio");
    }

    #[test]
    fn only_exact_true_collapses_sidebar() {
        let (store, _) = store_with(&[(SIDEBAR_COLLAPSED, "yes"), (THEME, "solarized")]);
        let state = store.state();
        assert!(!state.sidebar_collapsed);
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn sidebar_and_theme_are_persisted() {
        let (store, storage) = store_with(&[]);

        store.dispatch(UiAction::ToggleSidebar);
        assert_eq!(storage.get(SIDEBAR_COLLAPSED).as_deref(), Some("true"));
        store.dispatch(UiAction::SetSidebarCollapsed(false));
        assert_eq!(storage.get(SIDEBAR_COLLAPSED).as_deref(), Some("false"));

        store.dispatch(UiAction::SetTheme(Theme::Dark));
        assert_eq!(storage.get(THEME).as_deref(), Some("dark"));
        assert_eq!(store.state().theme, Theme::Dark);
    }

    #[test]
    fn modals_open_close_and_close_all() {
        let (store, _) = store_with(&[]);
        store.dispatch(UiAction::OpenModal {
            modal: "deleteDevice".into(),
            data: Some(json!({ "id": "d1" })),
        });
        store.dispatch(UiAction::OpenModal {
            modal: "importYang".into(),
            data: None,
        });
        assert!(store.state().is_modal_open("deleteDevice"));

        store.dispatch(UiAction::CloseModal("deleteDevice".into()));
        let state = store.state();
        assert_eq!(state.modals["deleteDevice"], ModalState::default());
        assert!(state.is_modal_open("importYang"));

        store.dispatch(UiAction::CloseAllModals);
        let state = store.state();
        assert_eq!(state.modals.len(), 2);
        assert!(state.modals.values().all(|m| !m.is_open && m.data.is_none()));
    }

    #[test]
    fn filters_and_errors_set_and_clear() {
        let (store, _) = store_with(&[]);
        store.dispatch(UiAction::SetFilter {
            key: "devices.vendor".into(),
            value: json!("cisco"),
        });
        store.dispatch(UiAction::SetFilter {
            key: "devices.protocol".into(),
            value: json!("netconf"),
        });
        store.dispatch(UiAction::ClearFilter("devices.vendor".into()));
        assert_eq!(
            store.state().filters.keys().collect::<Vec<_>>(),
            vec!["devices.protocol"]
        );
        store.dispatch(UiAction::ClearAllFilters);
        assert!(store.state().filters.is_empty());

        store.dispatch(UiAction::SetError {
            key: "devices".into(),
            error: Some("Failed to fetch devices".into()),
        });
        store.dispatch(UiAction::SetError {
            key: "services".into(),
            error: None,
        });
        assert_eq!(store.state().errors.len(), 2);
        store.dispatch(UiAction::ClearError("devices".into()));
        assert!(!store.state().errors.contains_key("devices"));
        store.dispatch(UiAction::ClearAllErrors);
        assert!(store.state().errors.is_empty());
    }

    #[test]
    fn page_title_drives_window_title() {
        let (store, _) = store_with(&[]);
        store.dispatch(UiAction::SetPageTitle("Devices".into()));
        assert_eq!(store.state().window_title(), "Devices - Mapper Design Studio");
    }

    #[test]
    fn loading_and_notification_panel() {
        let (store, _) = store_with(&[]);
        store.dispatch(UiAction::SetGlobalLoading(true));
        store.dispatch(UiAction::SetComponentLoading {
            component: "deviceList".into(),
            loading: true,
        });
        store.dispatch(UiAction::SetNotificationsVisible(true));
        store.dispatch(UiAction::SetUnreadNotificationCount(4));
        store.dispatch(UiAction::SetBreadcrumbs(vec![
            Breadcrumb::new("Devices", Some("/devices")),
            Breadcrumb::new("edge-01", None),
        ]));

        let state = store.state();
        assert!(state.loading.global);
        assert!(state.is_component_loading("deviceList"));
        assert!(!state.is_component_loading("serviceList"));
        assert!(state.notifications.show);
        assert_eq!(state.notifications.unread_count, 4);
        assert_eq!(state.breadcrumbs[1].path, None);
    }
}
