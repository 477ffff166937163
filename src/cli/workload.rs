//! Headless workload commands: `list` and the lifecycle actions

use crate::backend::kube::KubeBackendSettings;
use crate::backend::{KubeBackend, ListQuery, PrometheusMonitor, WorkloadBackend};
use crate::config::Config;
use crate::constants::AVERAGE_WINDOW_MINUTES;
use crate::models::{MetricsUpdate, render_table, workload_columns};
use crate::sync::{LifecycleAction, PaginationState, RequestController, SyncSettings};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Build the cluster backend described by `config`
pub fn build_backend(client: kube::Client, config: &Config) -> Result<KubeBackend> {
    let monitor = match &config.backend.prometheus_url {
        Some(url) => Some(PrometheusMonitor::new(
            url,
            Duration::from_secs(config.backend.request_timeout_secs),
            AVERAGE_WINDOW_MINUTES,
            config.sync.series_length,
        )?),
        None => {
            tracing::debug!("No Prometheus URL configured, averages stay empty");
            None
        }
    };

    let settings = KubeBackendSettings {
        app_label: config.backend.app_label.clone(),
        series_length: config.sync.series_length,
        read_only: config.read_only,
    };
    Ok(KubeBackend::new(client, settings, monitor))
}

/// Starting pagination for a session
///
/// A `--location` query string wins; otherwise the first page of `namespace`.
pub fn initial_pagination(
    location: Option<&str>,
    namespace: &str,
    page_size: usize,
) -> PaginationState {
    match location {
        Some(query) => {
            let state = PaginationState::from_query(query);
            tracing::debug!("Restored location: {}", state.to_query());
            state
        }
        None => PaginationState::new(namespace, page_size),
    }
}

/// One list fetch plus one metrics pass, rendered as a text table
pub async fn list_command(
    backend: Arc<dyn WorkloadBackend>,
    pagination: PaginationState,
    settings: &SyncSettings,
    ascii: bool,
) -> Result<String> {
    let query = ListQuery::from(&pagination);
    let page = backend
        .list_workloads(&query)
        .await
        .context("Failed to load applications")?;

    let results: Arc<Mutex<HashMap<String, MetricsUpdate>>> = Arc::default();
    let tasks: Vec<_> = page
        .items
        .iter()
        .filter(|w| !w.is_paused)
        .map(|w| {
            let backend = Arc::clone(&backend);
            let results = Arc::clone(&results);
            let (id, namespace, name) = (w.id.clone(), w.namespace.clone(), w.name.clone());
            move || async move {
                let update = backend.get_workload_metrics(&namespace, &name).await?;
                if let Ok(mut results) = results.lock() {
                    results.insert(id, update);
                }
                Ok::<(), crate::error::DeckError>(())
            }
        })
        .collect();

    let report = RequestController::new()
        .run_tasks(tasks, settings.concurrency)
        .await?;
    if report.failed > 0 {
        tracing::warn!("{} of {} metric requests failed", report.failed, report.started);
    }

    let mut items = page.items;
    if let Ok(results) = results.lock() {
        for item in items.iter_mut() {
            if let Some(update) = results.get(&item.id) {
                item.apply_metrics(update);
            }
        }
    }

    let mut out = render_table(&workload_columns(ascii), &items);
    out.push_str(&format!(
        "\nnamespace {}  page {}/{}  {} workloads\n",
        query.namespace,
        page.page,
        page.total_pages.max(1),
        page.total
    ));
    Ok(out)
}

/// Run a lifecycle action from the command line
pub async fn lifecycle_command(
    backend: &dyn WorkloadBackend,
    action: LifecycleAction,
    namespace: &str,
    name: &str,
    read_only: bool,
) -> Result<()> {
    if read_only {
        anyhow::bail!(
            "Refusing to {} {}/{}: readOnly is enabled",
            action.verb(),
            namespace,
            name
        );
    }

    action
        .execute(backend, namespace, name)
        .await
        .with_context(|| format!("Failed to {} {}/{}", action.verb(), namespace, name))?;
    tracing::info!("{} {}/{} succeeded", action.verb(), namespace, name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::WorkloadPage;
    use crate::error::DeckResult;
    use crate::models::AverageUsage;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        Backend {}

        #[async_trait]
        impl WorkloadBackend for Backend {
            async fn list_workloads(&self, query: &ListQuery) -> DeckResult<WorkloadPage>;
            async fn get_workload_metrics(&self, namespace: &str, name: &str) -> DeckResult<MetricsUpdate>;
            async fn get_average_metrics(&self, namespace: &str, name: &str) -> DeckResult<AverageUsage>;
            async fn list_namespaces(&self) -> DeckResult<Vec<String>>;
            async fn pause_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;
            async fn start_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;
            async fn restart_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;
            async fn delete_workload(&self, namespace: &str, name: &str) -> DeckResult<()>;
        }
    }

    #[tokio::test]
    async fn test_read_only_refuses_delete() {
        // No expectations: any backend call would panic
        let backend = MockBackend::new();
        let err = lifecycle_command(&backend, LifecycleAction::Delete, "team", "api", true)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Refusing to delete team/api: readOnly is enabled"
        );
    }

    #[tokio::test]
    async fn test_delete_runs_against_backend() {
        let mut backend = MockBackend::new();
        backend
            .expect_delete_workload()
            .withf(|namespace, name| namespace == "team" && name == "api")
            .times(1)
            .returning(|_, _| Ok(()));
        lifecycle_command(&backend, LifecycleAction::Delete, "team", "api", false)
            .await
            .unwrap();
    }

    #[test]
    fn test_initial_pagination_prefers_location() {
        let state = initial_pagination(Some("?namespace=ns-a&page=2&pageSize=20"), "default", 10);
        assert_eq!(state.namespace, "ns-a");
        assert_eq!(state.page, 2);
        assert_eq!(state.page_size, 20);

        let state = initial_pagination(None, "ns-b", 50);
        assert_eq!(state.namespace, "ns-b");
        assert_eq!(state.page, 1);
        assert_eq!(state.page_size, 50);
    }
}
