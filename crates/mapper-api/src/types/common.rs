use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ── Pagination ───────────────────────────────────────────────────────

/// Pagination block returned alongside every list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Default for Pagination {
    /// The first, empty page.
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            total: 0,
            total_pages: 0,
            has_next: false,
            has_prev: false,
        }
    }
}

/// One page of a resource list.
///
/// The backend names the list after the resource (`devices`, `models`,
/// `schemas`, ...); all of those land in `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(
        alias = "devices",
        alias = "models",
        alias = "schemas",
        alias = "mappings",
        alias = "templates",
        alias = "services"
    )]
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Query for paginated list endpoints: `?page=&limit=&search=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: String::new(),
        }
    }
}

impl ListQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: String::new(),
        }
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

// ── Shared reports ───────────────────────────────────────────────────

/// Outcome of a server-side validation (schemas, mappings, templates, services).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Request body for clone endpoints.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CloneRequest<'a> {
    pub name: &'a str,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_query_is_first_page_of_twenty() {
        let query = ListQuery::default();
        assert_eq!((query.page, query.limit, query.search.as_str()), (1, 20, ""));
    }

    #[test]
    fn page_accepts_resource_named_list() {
        let page: Page<String> = serde_json::from_value(json!({
            "schemas": ["a", "b"],
            "pagination": {
                "page": 1, "limit": 20, "total": 2,
                "totalPages": 1, "hasNext": false, "hasPrev": false
            }
        }))
        .unwrap();
        assert_eq!(page.items, vec!["a", "b"]);
        assert_eq!(page.pagination.total, 2);
    }

    #[test]
    fn page_without_pagination_is_rejected() {
        let result = serde_json::from_value::<Page<String>>(json!({ "devices": [] }));
        assert!(result.is_err());
    }
}
