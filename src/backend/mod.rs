//! Workload backends
//!
//! The synchronizer only talks to a [`WorkloadBackend`]. [`KubeBackend`] is the
//! cluster implementation; tests provide their own.

pub mod adapt;
pub mod kube;
pub mod monitor;

pub use self::kube::KubeBackend;
pub use monitor::PrometheusMonitor;

use crate::error::DeckResult;
use crate::models::{AverageUsage, MetricsUpdate, WorkloadSummary};
use crate::sync::pagination::{PaginationState, pages_for};
use async_trait::async_trait;

/// Server-side list query derived from the pagination state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub namespace: String,
    pub page: usize,
    pub page_size: usize,
    pub filter_text: String,
}

impl From<&PaginationState> for ListQuery {
    fn from(state: &PaginationState) -> Self {
        Self {
            namespace: state.namespace.clone(),
            page: state.page,
            page_size: state.page_size,
            filter_text: state.filter_text.clone(),
        }
    }
}

/// One page of workloads plus the totals of the whole result
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadPage {
    pub items: Vec<WorkloadSummary>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Source of workload lists, metrics and lifecycle operations
#[async_trait]
pub trait WorkloadBackend: Send + Sync {
    /// List one page of workloads matching the query
    async fn list_workloads(&self, query: &ListQuery) -> DeckResult<WorkloadPage>;

    /// Latest utilisation samples and replica counts for one workload
    ///
    /// A workload without metrics yet yields an empty update, not an error.
    async fn get_workload_metrics(&self, namespace: &str, name: &str)
    -> DeckResult<MetricsUpdate>;

    /// Average utilisation series for one workload, same contract as above
    async fn get_average_metrics(&self, namespace: &str, name: &str) -> DeckResult<AverageUsage>;

    async fn list_namespaces(&self) -> DeckResult<Vec<String>>;

    /// Scale to zero, remembering the current replica count
    async fn pause_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;

    /// Scale back to the replica count recorded by a pause
    async fn start_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;

    /// Trigger a rolling restart
    async fn restart_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;

    /// Delete the workload object; its pods go with it
    async fn delete_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;
}

/// Filter, sort and slice a full workload list into the requested page
///
/// Filtering is a case-insensitive substring match on the name. Items are
/// ordered newest first; entries without a creation time sort last.
pub fn paginate(mut items: Vec<WorkloadSummary>, query: &ListQuery) -> WorkloadPage {
    let needle = query.filter_text.trim().to_lowercase();
    if !needle.is_empty() {
        items.retain(|w| w.name.to_lowercase().contains(&needle));
    }
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.name.cmp(&b.name)));

    let total = items.len();
    let page_size = query.page_size.max(1);
    let start = query.page.saturating_sub(1).saturating_mul(page_size);
    let page_items: Vec<WorkloadSummary> = items.into_iter().skip(start).take(page_size).collect();

    WorkloadPage {
        items: page_items,
        total,
        page: query.page,
        page_size,
        total_pages: pages_for(total, page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkloadKind;
    use chrono::{TimeZone, Utc};

    fn workload(name: &str, minute: u32) -> WorkloadSummary {
        let mut w = WorkloadSummary::new(
            format!("uid-{}", name),
            name,
            "default",
            WorkloadKind::Deployment,
            5,
        );
        w.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).single();
        w
    }

    fn query(page: usize, page_size: usize, filter: &str) -> ListQuery {
        ListQuery {
            namespace: "default".into(),
            page,
            page_size,
            filter_text: filter.into(),
        }
    }

    #[test]
    fn test_paginate_sorts_newest_first() {
        let items = (0..25).map(|i| workload(&format!("app-{:02}", i), i)).collect();
        let page = paginate(items, &query(1, 10, ""));
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].name, "app-24");

        let items = (0..25).map(|i| workload(&format!("app-{:02}", i), i)).collect();
        let last = paginate(items, &query(3, 10, ""));
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.items[4].name, "app-00");
    }

    #[test]
    fn test_paginate_filters_case_insensitively() {
        let items = vec![workload("Web-Front", 1), workload("worker", 2), workload("api", 3)];
        let page = paginate(items, &query(1, 10, "WEB"));
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Web-Front");
    }

    #[test]
    fn test_paginate_past_the_end_is_empty() {
        let items = vec![workload("a", 1)];
        let page = paginate(items, &query(4, 10, ""));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
    }
}
