//! List synchronization core
//!
//! Leaf-first:
//! - `throttle` - bounded-concurrency task runner
//! - `viewport` - which rows are on screen
//! - `debounce` - coalesced search input
//! - `pagination` - page, page size, namespace and filter
//! - `store` / `synchronizer` - the keyed list and its three refresh cadences

pub mod debounce;
pub mod pagination;
pub mod store;
pub mod synchronizer;
pub mod throttle;
pub mod viewport;

pub use debounce::SearchDebouncer;
pub use pagination::{Navigation, PaginationState};
pub use store::{ListSnapshot, Notice, WorkloadStore};
pub use synchronizer::{AppListSynchronizer, LifecycleAction, SyncHandle, SyncSettings};
pub use throttle::{BatchReport, RequestController};
pub use viewport::{ViewportTracker, select_priority};
