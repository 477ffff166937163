//! launchdeck library
//!
//! Keeps a paginated, filtered list of application workloads in sync with
//! live metrics. The binary wraps it in a terminal UI; everything here is also
//! usable headless and from tests.

pub mod backend;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod kube;
pub mod models;
pub mod sync;
#[cfg(feature = "tui")]
pub mod tui;

// Re-export commonly used types for convenience
pub use backend::{ListQuery, WorkloadBackend, WorkloadPage};
pub use error::{DeckError, DeckResult};
pub use models::{WorkloadStatus, WorkloadSummary};
pub use sync::{AppListSynchronizer, ListSnapshot, Navigation, PaginationState, SyncHandle};
