//! Kubernetes-backed workload source
//!
//! Lists Deployments and StatefulSets carrying the app label, reads pod
//! metrics from `metrics.k8s.io` and delegates average utilisation to an
//! optional [`PrometheusMonitor`]. Lifecycle operations are merge patches,
//! apart from delete.

use super::adapt::{
    container_requests, desired_replicas, parse_timestamp, paused_replicas, pod_metrics_usage,
    replica_counts, utilisation, workload_from_value,
};
use super::monitor::PrometheusMonitor;
use super::{ListQuery, WorkloadBackend, WorkloadPage, paginate};
use crate::constants::{PAUSE_ANNOTATION, RESTARTED_AT_ANNOTATION};
use crate::error::{DeckError, DeckResult};
use crate::models::{AverageUsage, MetricSample, MetricsUpdate, WorkloadKind, WorkloadSummary};
use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Client, ResourceExt};
use serde_json::{Value, json};

/// Backend settings derived from configuration
#[derive(Debug, Clone)]
pub struct KubeBackendSettings {
    /// Label selecting managed workloads (existence match)
    pub app_label: String,
    pub series_length: usize,
    pub read_only: bool,
}

pub struct KubeBackend {
    client: Client,
    settings: KubeBackendSettings,
    monitor: Option<PrometheusMonitor>,
}

impl KubeBackend {
    pub fn new(
        client: Client,
        settings: KubeBackendSettings,
        monitor: Option<PrometheusMonitor>,
    ) -> Self {
        Self {
            client,
            settings,
            monitor,
        }
    }

    fn pod_metrics_api(&self, namespace: &str) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk("metrics.k8s.io", "v1beta1", "PodMetrics");
        let resource = ApiResource::from_gvk_with_plural(&gvk, "pods");
        Api::namespaced_with(self.client.clone(), namespace, &resource)
    }

    fn to_summaries<K: serde::Serialize>(
        &self,
        kind: WorkloadKind,
        objects: Vec<K>,
    ) -> DeckResult<Vec<WorkloadSummary>> {
        let now = Utc::now();
        let mut out = Vec::with_capacity(objects.len());
        for obj in objects {
            let value =
                serde_json::to_value(&obj).map_err(|e| DeckError::Upstream(e.to_string()))?;
            match workload_from_value(kind, &value, self.settings.series_length, now) {
                Some(w) => out.push(w),
                None => tracing::debug!("Skipping {} without uid or name", kind.as_str()),
            }
        }
        Ok(out)
    }

    /// Find a workload by name, trying Deployments first
    async fn resolve(&self, namespace: &str, name: &str) -> DeckResult<(WorkloadKind, Value)> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        if let Some(d) = deployments.get_opt(name).await? {
            let value = serde_json::to_value(&d).map_err(|e| DeckError::Upstream(e.to_string()))?;
            return Ok((WorkloadKind::Deployment, value));
        }

        let sets: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        if let Some(s) = sets.get_opt(name).await? {
            let value = serde_json::to_value(&s).map_err(|e| DeckError::Upstream(e.to_string()))?;
            return Ok((WorkloadKind::StatefulSet, value));
        }

        Err(DeckError::Upstream(format!(
            "workload {}/{} not found",
            namespace, name
        )))
    }

    fn ensure_writable(&self) -> DeckResult<()> {
        if self.settings.read_only {
            return Err(DeckError::invalid("read-only mode is enabled"));
        }
        Ok(())
    }

    async fn patch(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> DeckResult<()> {
        self.ensure_writable()?;
        let params = PatchParams::default();
        match kind {
            WorkloadKind::Deployment => {
                let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
                api.patch(name, &params, &Patch::Merge(patch)).await?;
            }
            WorkloadKind::StatefulSet => {
                let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
                api.patch(name, &params, &Patch::Merge(patch)).await?;
            }
        }
        tracing::info!("Patched {} {}/{}", kind.as_str(), namespace, name);
        Ok(())
    }
}

#[async_trait]
impl WorkloadBackend for KubeBackend {
    async fn list_workloads(&self, query: &ListQuery) -> DeckResult<WorkloadPage> {
        let lp = ListParams::default().labels(&self.settings.app_label);
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), &query.namespace);
        let sets: Api<StatefulSet> = Api::namespaced(self.client.clone(), &query.namespace);

        let (deployments, sets) = tokio::join!(deployments.list(&lp), sets.list(&lp));

        let mut items = Vec::new();
        let mut last_error = None;
        match deployments {
            Ok(list) => items.extend(self.to_summaries(WorkloadKind::Deployment, list.items)?),
            Err(e) => {
                tracing::warn!("Failed to list deployments in {}: {}", query.namespace, e);
                last_error = Some(DeckError::from(e));
            }
        }
        match sets {
            Ok(list) => items.extend(self.to_summaries(WorkloadKind::StatefulSet, list.items)?),
            Err(e) => {
                tracing::warn!("Failed to list statefulsets in {}: {}", query.namespace, e);
                if let Some(first) = last_error.take() {
                    return Err(first);
                }
                last_error = Some(DeckError::from(e));
            }
        }
        if let Some(e) = last_error {
            tracing::debug!("Listing continued with partial results: {}", e);
        }

        Ok(paginate(items, query))
    }

    async fn get_workload_metrics(
        &self,
        namespace: &str,
        name: &str,
    ) -> DeckResult<MetricsUpdate> {
        let (_, workload) = self.resolve(namespace, name).await?;
        let requests = container_requests(&workload["spec"]["template"]["spec"]);

        let lp = ListParams::default().labels(&format!("app={}", name));
        let pods = self.pod_metrics_api(namespace).list(&lp).await?;
        let replicas = if paused_replicas(&workload).is_some() {
            None
        } else {
            Some(replica_counts(&workload))
        };

        if pods.items.is_empty() {
            tracing::debug!("No pod metrics yet for {}/{}", namespace, name);
            return Ok(MetricsUpdate {
                replicas,
                ..MetricsUpdate::empty()
            });
        }

        let pod_count = pods.items.len() as u64;
        let (cpu, memory) = pods.items.iter().fold((0u64, 0u64), |(cpu, mem), pod| {
            let (c, m) = pod_metrics_usage(&pod.data);
            (cpu.saturating_add(c), mem.saturating_add(m))
        });
        let timestamp = pods
            .items
            .iter()
            .filter_map(|p| p.data["timestamp"].as_str())
            .filter_map(parse_timestamp)
            .max()
            .unwrap_or_else(Utc::now)
            .timestamp();

        tracing::debug!(
            "Metrics for {}/{}: {} pods, {}m cpu, {} bytes",
            namespace,
            name,
            pod_count,
            cpu,
            memory
        );

        Ok(MetricsUpdate {
            cpu: vec![MetricSample::new(
                timestamp,
                utilisation(cpu, requests.cpu_millicores.saturating_mul(pod_count)),
            )],
            memory: vec![MetricSample::new(
                timestamp,
                utilisation(memory, requests.memory_bytes.saturating_mul(pod_count)),
            )],
            replicas,
        })
    }

    async fn get_average_metrics(&self, namespace: &str, name: &str) -> DeckResult<AverageUsage> {
        match &self.monitor {
            Some(monitor) => monitor.average_usage(namespace, name).await,
            None => Ok(AverageUsage::default()),
        }
    }

    async fn list_namespaces(&self) -> DeckResult<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn pause_workload(&self, namespace: &str, name: &str) -> DeckResult<()> {
        let (kind, workload) = self.resolve(namespace, name).await?;
        if paused_replicas(&workload).is_some() {
            tracing::debug!("{}/{} is already paused", namespace, name);
            return Ok(());
        }
        let replicas = desired_replicas(&workload).max(1);
        let patch = json!({
            "metadata": { "annotations": { PAUSE_ANNOTATION: replicas.to_string() } },
            "spec": { "replicas": 0 }
        });
        self.patch(kind, namespace, name, &patch).await
    }

    async fn start_workload(&self, namespace: &str, name: &str) -> DeckResult<()> {
        let (kind, workload) = self.resolve(namespace, name).await?;
        let Some(replicas) = paused_replicas(&workload) else {
            return Err(DeckError::invalid(format!(
                "{}/{} is not paused",
                namespace, name
            )));
        };
        let patch = json!({
            "metadata": { "annotations": { PAUSE_ANNOTATION: null } },
            "spec": { "replicas": replicas }
        });
        self.patch(kind, namespace, name, &patch).await
    }

    async fn restart_workload(&self, namespace: &str, name: &str) -> DeckResult<()> {
        let (kind, _) = self.resolve(namespace, name).await?;
        let patch = json!({
            "spec": {
                "template": {
                    "metadata": {
                        "annotations": { RESTARTED_AT_ANNOTATION: Utc::now().to_rfc3339() }
                    }
                }
            }
        });
        self.patch(kind, namespace, name, &patch).await
    }

    async fn delete_workload(&self, namespace: &str, name: &str) -> DeckResult<()> {
        self.ensure_writable()?;
        let (kind, _) = self.resolve(namespace, name).await?;
        let params = DeleteParams::background();
        match kind {
            WorkloadKind::Deployment => {
                let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
                api.delete(name, &params).await?;
            }
            WorkloadKind::StatefulSet => {
                let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
                api.delete(name, &params).await?;
            }
        }
        tracing::info!("Deleted {} {}/{}", kind.as_str(), namespace, name);
        Ok(())
    }
}
