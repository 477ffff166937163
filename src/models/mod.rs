//! Workload model layer
//!
//! Structure:
//! - `workload.rs` - list entries, status, fixed-length metric series
//! - `columns.rs` - typed column descriptors and plain-text rendering

pub mod columns;
pub mod workload;

pub use columns::{Align, Column, render_table, sparkline, workload_columns};
pub use workload::{
    AverageUsage, GpuRequest, MetricSample, MetricSeries, MetricsUpdate, ReplicaCounts,
    ResourceRequests, WorkloadKind, WorkloadStatus, WorkloadSummary,
};
