//! Conversion of cluster objects into workload entries
//!
//! Deployments and StatefulSets are read as JSON (`serde_json::to_value` of the
//! typed object) so both kinds share one code path. Quantity parsing follows
//! the Kubernetes suffix rules for CPU and memory.

use crate::constants::PAUSE_ANNOTATION;
use crate::models::{
    GpuRequest, ReplicaCounts, ResourceRequests, WorkloadKind, WorkloadStatus, WorkloadSummary,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Annotations carrying autoscaling bounds
const MIN_REPLICAS_ANNOTATION: &str = "deploy.cloud.sealos.io/minReplicas";
const MAX_REPLICAS_ANNOTATION: &str = "deploy.cloud.sealos.io/maxReplicas";

const GPU_RESOURCE: &str = "nvidia.com/gpu";
const GPU_PRODUCT_SELECTOR: &str = "nvidia.com/gpu.product";

/// Grace period during which a workload without ready pods counts as creating
const CREATING_GRACE_SECS: i64 = 300;

/// Build a list entry from a Deployment or StatefulSet
///
/// Returns `None` when the object lacks a uid or name.
pub fn workload_from_value(
    kind: WorkloadKind,
    obj: &Value,
    series_length: usize,
    now: DateTime<Utc>,
) -> Option<WorkloadSummary> {
    let metadata = obj.get("metadata")?;
    let uid = metadata.get("uid").and_then(Value::as_str)?;
    let name = metadata.get("name").and_then(Value::as_str)?;
    let namespace = metadata
        .get("namespace")
        .and_then(Value::as_str)
        .unwrap_or("default");

    let mut workload = WorkloadSummary::new(uid, name, namespace, kind, series_length);
    workload.created_at = metadata
        .get("creationTimestamp")
        .and_then(Value::as_str)
        .and_then(parse_timestamp);

    let pod_spec = &obj["spec"]["template"]["spec"];
    workload.requests = container_requests(pod_spec);
    workload.gpu = gpu_request(pod_spec);
    workload.priority = pod_spec
        .get("priorityClassName")
        .and_then(Value::as_str)
        .map(str::to_string);
    workload.storage_gib = storage_gib(obj);

    workload.is_paused = annotation(obj, PAUSE_ANNOTATION).is_some();
    workload.replicas = replica_counts(obj);
    workload.is_stopped = !workload.is_paused && desired_replicas(obj) == 0;
    workload.normalize_replicas();
    workload.status = derive_status(obj, workload.created_at, now);

    Some(workload)
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn annotation<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj["metadata"]["annotations"].get(key).and_then(Value::as_str)
}

pub fn desired_replicas(obj: &Value) -> u32 {
    obj["spec"]["replicas"].as_u64().unwrap_or(1) as u32
}

/// Replica count recorded by a pause, at least 1
pub fn paused_replicas(obj: &Value) -> Option<u32> {
    annotation(obj, PAUSE_ANNOTATION).map(|raw| raw.trim().parse::<u32>().unwrap_or(1).max(1))
}

/// Desired replicas plus autoscaling bounds when annotated
pub fn replica_counts(obj: &Value) -> ReplicaCounts {
    let desired = desired_replicas(obj);
    let bound = |key: &str| annotation(obj, key).and_then(|v| v.trim().parse::<u32>().ok());
    ReplicaCounts {
        active: desired,
        min: bound(MIN_REPLICAS_ANNOTATION).unwrap_or(desired),
        max: bound(MAX_REPLICAS_ANNOTATION).unwrap_or(desired),
    }
}

/// Lifecycle status from spec, status and conditions
pub fn derive_status(
    obj: &Value,
    created_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> WorkloadStatus {
    if annotation(obj, PAUSE_ANNOTATION).is_some() {
        return WorkloadStatus::Paused;
    }
    let desired = desired_replicas(obj);
    if desired == 0 {
        return WorkloadStatus::Stopped;
    }

    let status = &obj["status"];
    let failed = status["conditions"]
        .as_array()
        .map(|conditions| {
            conditions.iter().any(|c| {
                let kind = c["type"].as_str().unwrap_or_default();
                let state = c["status"].as_str().unwrap_or_default();
                (kind == "ReplicaFailure" && state == "True")
                    || (kind == "Progressing" && state == "False")
            })
        })
        .unwrap_or(false);
    if failed {
        return WorkloadStatus::Error;
    }

    let ready = status["readyReplicas"].as_u64().unwrap_or(0) as u32;
    if ready >= desired {
        return WorkloadStatus::Running;
    }

    let young = created_at.is_some_and(|t| (now - t).num_seconds() < CREATING_GRACE_SECS);
    if ready == 0 && young {
        WorkloadStatus::Creating
    } else {
        WorkloadStatus::Waiting
    }
}

/// Sum of container requests, falling back to limits per container
pub fn container_requests(pod_spec: &Value) -> ResourceRequests {
    let Some(containers) = pod_spec["containers"].as_array() else {
        return ResourceRequests::default();
    };

    containers
        .iter()
        .fold(ResourceRequests::default(), |acc, container| {
            let resources = &container["resources"];
            let quantity = |name: &str| {
                resources["requests"][name]
                    .as_str()
                    .or_else(|| resources["limits"][name].as_str())
            };
            let cpu = quantity("cpu").and_then(parse_cpu_millicores).unwrap_or(0);
            let memory = quantity("memory").and_then(parse_memory_bytes).unwrap_or(0);
            ResourceRequests {
                cpu_millicores: acc.cpu_millicores.saturating_add(cpu),
                memory_bytes: acc.memory_bytes.saturating_add(memory),
            }
        })
}

fn gpu_request(pod_spec: &Value) -> Option<GpuRequest> {
    let amount: u32 = pod_spec["containers"]
        .as_array()?
        .iter()
        .filter_map(|c| {
            let limit = &c["resources"]["limits"][GPU_RESOURCE];
            limit
                .as_str()
                .and_then(|s| s.parse::<u32>().ok())
                .or_else(|| limit.as_u64().map(|n| n as u32))
        })
        .sum();
    if amount == 0 {
        return None;
    }
    let model = pod_spec["nodeSelector"][GPU_PRODUCT_SELECTOR]
        .as_str()
        .unwrap_or_default()
        .to_string();
    Some(GpuRequest {
        manufacturer: "nvidia".to_string(),
        model,
        amount,
    })
}

/// Storage requested by StatefulSet volume claim templates, rounded up to GiB
pub fn storage_gib(obj: &Value) -> u32 {
    const GIB: u64 = 1_073_741_824;
    let bytes: u64 = obj["spec"]["volumeClaimTemplates"]
        .as_array()
        .map(|templates| {
            templates
                .iter()
                .filter_map(|t| t["spec"]["resources"]["requests"]["storage"].as_str())
                .filter_map(parse_memory_bytes)
                .sum()
        })
        .unwrap_or(0);
    bytes.div_ceil(GIB) as u32
}

/// Summed container usage of one PodMetrics object: (millicores, bytes)
pub fn pod_metrics_usage(data: &Value) -> (u64, u64) {
    let Some(containers) = data.get("containers").and_then(Value::as_array) else {
        return (0, 0);
    };

    containers
        .iter()
        .fold((0u64, 0u64), |(cpu, memory), container| {
            let usage = &container["usage"];
            let container_cpu = usage["cpu"]
                .as_str()
                .and_then(parse_cpu_millicores)
                .unwrap_or(0);
            let container_memory = usage["memory"]
                .as_str()
                .and_then(parse_memory_bytes)
                .unwrap_or(0);
            (
                cpu.saturating_add(container_cpu),
                memory.saturating_add(container_memory),
            )
        })
}

/// `usage / request * 100`, or 0 without a request
pub fn utilisation(usage: u64, request: u64) -> f64 {
    if request == 0 {
        return 0.0;
    }
    let percent = usage as f64 / request as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

pub fn parse_cpu_millicores(value: &str) -> Option<u64> {
    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }

    let (number, multiplier) = if let Some(number) = raw.strip_suffix('m') {
        (number, 1.0)
    } else if let Some(number) = raw.strip_suffix('u') {
        (number, 0.001)
    } else if let Some(number) = raw.strip_suffix('n') {
        (number, 0.000_001)
    } else {
        (raw, 1000.0)
    };

    let millicores = (number.parse::<f64>().ok()? * multiplier).round();
    if !millicores.is_finite() || millicores < 0.0 {
        return None;
    }
    Some(millicores as u64)
}

pub fn parse_memory_bytes(value: &str) -> Option<u64> {
    const UNITS: [(&str, f64); 12] = [
        ("Ei", 1_152_921_504_606_846_976.0),
        ("Pi", 1_125_899_906_842_624.0),
        ("Ti", 1_099_511_627_776.0),
        ("Gi", 1_073_741_824.0),
        ("Mi", 1_048_576.0),
        ("Ki", 1_024.0),
        ("E", 1e18),
        ("P", 1e15),
        ("T", 1e12),
        ("G", 1e9),
        ("M", 1e6),
        ("k", 1e3),
    ];

    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }

    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, m)| raw.strip_suffix(suffix).map(|n| (n, *m)))
        .or_else(|| raw.strip_suffix('K').map(|n| (n, 1e3)))
        .unwrap_or((raw, 1.0));

    let bytes = (number.parse::<f64>().ok()? * multiplier).round();
    if !bytes.is_finite() || bytes < 0.0 {
        return None;
    }
    Some(bytes as u64)
}
