// ── Resource slices ──
//
// Per-resource list state: the current page of items, the selected item,
// a loading flag and the last error. Each fetch is `begin` then `fulfil`
// or `reject`. There is no request fencing: when fetches overlap, the one
// that resolves last is what the slice shows.

use mapper_api::types::{Page, Pagination};
use serde::Serialize;
use tokio::sync::watch;

/// Snapshot of one resource list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceState<T> {
    pub items: Vec<T>,
    pub selected: Option<T>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub pagination: Pagination,
}

impl<T> Default for SliceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            is_loading: false,
            error: None,
            pagination: Pagination::default(),
        }
    }
}

/// Observable list state for one resource type.
pub struct ResourceSlice<T> {
    state: watch::Sender<SliceState<T>>,
    fallback_error: &'static str,
}

impl<T> std::fmt::Debug for ResourceSlice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSlice")
            .field("fallback_error", &self.fallback_error)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> ResourceSlice<T> {
    /// `fallback_error` is recorded when a rejection carries no message.
    pub fn new(fallback_error: &'static str) -> Self {
        let (state, _) = watch::channel(SliceState::default());
        Self {
            state,
            fallback_error,
        }
    }

    pub fn state(&self) -> SliceState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SliceState<T>> {
        self.state.subscribe()
    }

    pub fn begin(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    /// Replace items and pagination with a resolved page.
    pub fn fulfil(&self, page: Page<T>) {
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.items = page.items;
            s.pagination = page.pagination;
        });
    }

    /// Record a failed fetch. Items from the last success stay in place.
    pub fn reject(&self, message: &str) {
        let message = if message.is_empty() {
            self.fallback_error.to_owned()
        } else {
            message.to_owned()
        };
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.error = Some(message);
        });
    }

    pub fn select(&self, item: Option<T>) {
        self.state.send_modify(|s| s.selected = item);
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(items: &[&str], page: u32) -> Page<String> {
        Page {
            items: items.iter().map(|s| (*s).to_owned()).collect(),
            pagination: Pagination {
                page,
                limit: 2,
                total: 5,
                total_pages: 3,
                has_next: page < 3,
                has_prev: page > 1,
            },
        }
    }

    #[test]
    fn begin_clears_error_and_sets_loading() {
        let slice = ResourceSlice::<String>::new("Failed to fetch devices");
        slice.reject("");
        assert_eq!(
            slice.state().error.as_deref(),
            Some("Failed to fetch devices")
        );

        slice.begin();
        let state = slice.state();
        assert!(state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn fulfil_replaces_items_and_pagination() {
        let slice = ResourceSlice::new("Failed to fetch devices");
        slice.begin();
        slice.fulfil(page(&["a", "b"], 1));
        slice.begin();
        slice.fulfil(page(&["c", "d"], 2));

        let state = slice.state();
        assert!(!state.is_loading);
        assert_eq!(state.items, vec!["c".to_owned(), "d".to_owned()]);
        assert_eq!(state.pagination.page, 2);
        assert!(state.pagination.has_prev);
    }

    #[test]
    fn reject_keeps_previous_items() {
        let slice = ResourceSlice::new("Failed to fetch devices");
        slice.fulfil(page(&["a"], 1));
        slice.begin();
        slice.reject("Request failed with status code 500");

        let state = slice.state();
        assert_eq!(state.items, vec!["a".to_owned()]);
        assert_eq!(
            state.error.as_deref(),
            Some("Request failed with status code 500")
        );
        slice.clear_error();
        assert!(slice.state().error.is_none());
    }

    #[test]
    fn select_and_deselect() {
        let slice = ResourceSlice::new("Failed to fetch devices");
        slice.select(Some("edge-01".to_owned()));
        assert_eq!(slice.state().selected.as_deref(), Some("edge-01"));
        slice.select(None);
        assert!(slice.state().selected.is_none());
    }
}
