//! Workload list entries
//!
//! A [`WorkloadSummary`] is one row of the application list. It is built from a
//! list response and afterwards only touched by metric merges, which change the
//! utilisation series and replica counts and nothing else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Kind of object backing a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
}

impl WorkloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::StatefulSet => "StatefulSet",
        }
    }
}

/// Lifecycle status shown for a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkloadStatus {
    /// All desired replicas are ready
    Running,
    /// Recently created, replicas not reported yet
    Creating,
    /// Some replicas are not ready yet
    Waiting,
    /// Scaled down by a pause operation
    Paused,
    /// Zero desired replicas without a pause record
    Stopped,
    /// Rollout failed or replicas cannot be created
    Error,
}

impl WorkloadStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WorkloadStatus::Running => "Running",
            WorkloadStatus::Creating => "Creating",
            WorkloadStatus::Waiting => "Waiting",
            WorkloadStatus::Paused => "Paused",
            WorkloadStatus::Stopped => "Stopped",
            WorkloadStatus::Error => "Error",
        }
    }
}

/// One utilisation sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Unix timestamp in seconds, 0 for padding samples
    pub timestamp: i64,
    /// Utilisation in percent of the requested resource
    pub value: f64,
}

impl MetricSample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Fixed-length utilisation series, most recent sample last
///
/// The series is created full of zero samples and never changes length: every
/// push evicts the oldest sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    samples: VecDeque<MetricSample>,
}

impl MetricSeries {
    pub fn new(length: usize) -> Self {
        let length = length.max(1);
        Self {
            samples: std::iter::repeat_n(MetricSample::new(0, 0.0), length).collect(),
        }
    }

    /// Append a sample, dropping the oldest one
    pub fn push(&mut self, sample: MetricSample) {
        self.samples.pop_front();
        self.samples.push_back(sample);
    }

    pub fn extend(&mut self, samples: impl IntoIterator<Item = MetricSample>) {
        for sample in samples {
            self.push(sample);
        }
    }

    /// Swap in a whole window of samples, keeping the length
    ///
    /// Short windows are zero-padded at the front, long ones keep their tail.
    pub fn replace(&mut self, samples: impl IntoIterator<Item = MetricSample>) {
        let mut fresh = MetricSeries::new(self.len());
        fresh.extend(samples);
        *self = fresh;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }

    pub fn samples(&self) -> impl Iterator<Item = &MetricSample> {
        self.samples.iter()
    }

    /// Most recent real sample, ignoring the zero padding
    pub fn latest(&self) -> Option<f64> {
        self.samples
            .back()
            .filter(|s| s.timestamp > 0)
            .map(|s| s.value)
    }

    /// Whether any real sample has been recorded
    pub fn has_data(&self) -> bool {
        self.samples.iter().any(|s| s.timestamp > 0)
    }
}

/// Requested compute resources, summed over containers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequests {
    pub cpu_millicores: u64,
    pub memory_bytes: u64,
}

/// GPU request attached to a workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuRequest {
    pub manufacturer: String,
    pub model: String,
    pub amount: u32,
}

/// Replica counts for a workload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaCounts {
    pub active: u32,
    pub min: u32,
    pub max: u32,
}

impl ReplicaCounts {
    pub fn fixed(replicas: u32) -> Self {
        Self {
            active: replicas,
            min: replicas,
            max: replicas,
        }
    }
}

/// Partial update produced by a per-workload metrics request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsUpdate {
    pub cpu: Vec<MetricSample>,
    pub memory: Vec<MetricSample>,
    pub replicas: Option<ReplicaCounts>,
}

impl MetricsUpdate {
    /// Update for a workload the metrics API has no data for yet
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cpu.is_empty() && self.memory.is_empty() && self.replicas.is_none()
    }
}

/// Coarse average utilisation used for the list charts
///
/// Each value covers the whole query window, so it replaces the previous one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AverageUsage {
    pub cpu: Vec<MetricSample>,
    pub memory: Vec<MetricSample>,
}

/// One entry of the application list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSummary {
    /// Cluster uid of the backing object
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub kind: WorkloadKind,
    pub status: WorkloadStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub requests: ResourceRequests,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<GpuRequest>,
    pub cpu_usage: MetricSeries,
    pub memory_usage: MetricSeries,
    pub average_cpu: MetricSeries,
    pub average_memory: MetricSeries,
    pub replicas: ReplicaCounts,
    /// Persistent storage attached, in GiB
    pub storage_gib: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub is_paused: bool,
    pub is_stopped: bool,
}

impl WorkloadSummary {
    /// Create an entry with empty series and no replicas
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        kind: WorkloadKind,
        series_length: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            namespace: namespace.into(),
            kind,
            status: WorkloadStatus::Creating,
            created_at: None,
            requests: ResourceRequests::default(),
            gpu: None,
            cpu_usage: MetricSeries::new(series_length),
            memory_usage: MetricSeries::new(series_length),
            average_cpu: MetricSeries::new(series_length),
            average_memory: MetricSeries::new(series_length),
            replicas: ReplicaCounts::default(),
            storage_gib: 0,
            priority: None,
            is_paused: false,
            is_stopped: false,
        }
    }

    /// Keep `active <= max` and `min <= max` for running workloads
    pub fn normalize_replicas(&mut self) {
        if self.is_paused {
            return;
        }
        let r = &mut self.replicas;
        r.max = r.max.max(r.active).max(r.min);
    }

    /// Merge a metrics response: series and replica counts only
    pub fn apply_metrics(&mut self, update: &MetricsUpdate) {
        self.cpu_usage.extend(update.cpu.iter().copied());
        self.memory_usage.extend(update.memory.iter().copied());
        if let Some(replicas) = update.replicas {
            self.replicas = replicas;
            self.normalize_replicas();
        }
    }

    /// Replace the average series with a fresh window
    pub fn apply_average(&mut self, usage: &AverageUsage) {
        self.average_cpu.replace(usage.cpu.iter().copied());
        self.average_memory.replace(usage.memory.iter().copied());
    }

    /// Creation time formatted for display
    pub fn created_display(&self) -> String {
        self.created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn replicas_display(&self) -> String {
        let r = self.replicas;
        if r.min == r.max {
            format!("{}", r.active)
        } else {
            format!("{} ({}-{})", r.active, r.min, r.max)
        }
    }
}
