//! Pagination state and its query-string form
//!
//! [`PaginationState`] is the single source of the list query: namespace,
//! filter text, page and page size. Navigation is validated here, and every
//! accepted state can be written to and restored from a query string.

use crate::constants::{ALLOWED_PAGE_SIZES, DEFAULT_NAMESPACE, DEFAULT_PAGE_SIZE};
use crate::error::{DeckError, DeckResult};
use serde::Serialize;

/// Requested change to the pagination state; `None` fields are kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub namespace: Option<String>,
    pub filter_text: Option<String>,
}

impl Navigation {
    pub fn page(page: usize) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    pub fn page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    pub fn filter(filter_text: impl Into<String>) -> Self {
        Self {
            filter_text: Some(filter_text.into()),
            ..Default::default()
        }
    }
}

/// Current page of the workload list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub namespace: String,
    pub filter_text: String,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE, DEFAULT_PAGE_SIZE)
    }
}

impl PaginationState {
    /// First page of `namespace` with no totals yet
    ///
    /// A page size outside the allowed set falls back to the default.
    pub fn new(namespace: impl Into<String>, page_size: usize) -> Self {
        let page_size = if is_allowed_page_size(page_size) {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self {
            page: 1,
            page_size,
            total_items: 0,
            total_pages: 0,
            namespace: namespace.into(),
            filter_text: String::new(),
        }
    }

    /// Highest page that can currently be requested
    pub fn last_page(&self) -> usize {
        self.total_pages.max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Apply a navigation request, returning the new state
    ///
    /// A namespace or filter change resets to page 1, as does a page-size
    /// change. The current state is never modified; on error it stays valid.
    pub fn navigate(&self, nav: &Navigation) -> DeckResult<PaginationState> {
        if let Some(size) = nav.page_size {
            if !is_allowed_page_size(size) {
                return Err(DeckError::invalid(format!(
                    "pageSize {} is not allowed (expected one of {:?})",
                    size, ALLOWED_PAGE_SIZES
                )));
            }
        }

        let namespace_changed = nav
            .namespace
            .as_ref()
            .is_some_and(|ns| *ns != self.namespace);
        let filter_changed = nav
            .filter_text
            .as_ref()
            .is_some_and(|f| *f != self.filter_text);
        let size_changed = nav.page_size.is_some_and(|s| s != self.page_size);

        let mut next = self.clone();
        if let Some(ns) = &nav.namespace {
            next.namespace = ns.clone();
        }
        if let Some(filter) = &nav.filter_text {
            next.filter_text = filter.clone();
        }
        if let Some(size) = nav.page_size {
            next.page_size = size;
            next.total_pages = pages_for(next.total_items, size);
        }

        if namespace_changed || filter_changed || size_changed {
            next.page = 1;
        } else if let Some(page) = nav.page {
            if page == 0 || page > self.last_page() {
                return Err(DeckError::invalid(format!(
                    "page {} is out of range 1..={}",
                    page,
                    self.last_page()
                )));
            }
            next.page = page;
        }

        Ok(next)
    }

    pub fn next_page(&self) -> DeckResult<PaginationState> {
        self.navigate(&Navigation::page(self.page + 1))
    }

    pub fn prev_page(&self) -> DeckResult<PaginationState> {
        self.navigate(&Navigation::page(self.page.saturating_sub(1)))
    }

    /// Record the total item count from a list response
    ///
    /// Returns `true` when the current page fell out of range and was clamped
    /// to the last page.
    pub fn apply_totals(&mut self, total_items: usize) -> bool {
        self.total_items = total_items;
        self.total_pages = pages_for(total_items, self.page_size);
        let last = self.last_page();
        if self.page > last {
            tracing::debug!("Page {} out of range, clamping to {}", self.page, last);
            self.page = last;
            true
        } else {
            false
        }
    }

    /// Whether two states ask the backend for the same data
    pub fn same_query(&self, other: &PaginationState) -> bool {
        self.page == other.page
            && self.page_size == other.page_size
            && self.namespace == other.namespace
            && self.filter_text == other.filter_text
    }

    /// Encode as a query string (`namespace`, `page`, `pageSize`, `filterText`)
    pub fn to_query(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer
            .append_pair("namespace", &self.namespace)
            .append_pair("page", &self.page.to_string())
            .append_pair("pageSize", &self.page_size.to_string());
        if !self.filter_text.is_empty() {
            serializer.append_pair("filterText", &self.filter_text);
        }
        serializer.finish()
    }

    /// Restore state from a query string
    ///
    /// Lenient: missing or unparseable values fall back to page 1, page size
    /// 10 and the `default` namespace. Totals are unknown until the first
    /// response, so the page is only clamped by [`Self::apply_totals`].
    pub fn from_query(query: &str) -> PaginationState {
        let query = query.trim_start_matches('?');
        let mut state = PaginationState::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "namespace" if !value.trim().is_empty() => {
                    state.namespace = value.trim().to_string();
                }
                "page" => {
                    state.page = value.parse::<usize>().ok().filter(|p| *p > 0).unwrap_or(1);
                }
                "pageSize" => {
                    state.page_size = value
                        .parse::<usize>()
                        .ok()
                        .filter(|s| is_allowed_page_size(*s))
                        .unwrap_or(DEFAULT_PAGE_SIZE);
                }
                "filterText" => state.filter_text = value.into_owned(),
                _ => {}
            }
        }

        state
    }
}

pub fn is_allowed_page_size(size: usize) -> bool {
    ALLOWED_PAGE_SIZES.contains(&size)
}

/// `ceil(total_items / page_size)`
pub fn pages_for(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}
