//! Constants used throughout the crate
//!
//! Defaults for the refresh cadences, pagination and display. Most of these can
//! be overridden from the `sync` section of the configuration file.

/// Full list refresh interval in milliseconds
pub const FULL_REFRESH_MS: u64 = 3_000;

/// Per-workload metrics refresh interval in milliseconds
pub const METRICS_REFRESH_MS: u64 = 3_000;

/// Average utilisation refresh interval in milliseconds (2 minutes)
pub const AVERAGE_REFRESH_MS: u64 = 120_000;

/// Maximum number of per-workload metric requests in flight
pub const METRICS_CONCURRENCY: usize = 3;

/// Below this many visible rows the viewport is considered unknown
pub const VIEWPORT_MIN_VISIBLE: usize = 3;

/// Quiet period before a search query is issued
pub const SEARCH_DEBOUNCE_MS: u64 = 500;

/// Number of samples kept per utilisation series
pub const SERIES_LENGTH: usize = 30;

/// Page sizes the list accepts
pub const ALLOWED_PAGE_SIZES: &[usize] = &[10, 20, 50];

/// Page size used when none is given
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Namespace used when none is given
pub const DEFAULT_NAMESPACE: &str = "default";

/// Label marking deployments and statefulsets managed by the console
pub const APP_DEPLOY_LABEL: &str = "cloud.sealos.io/app-deploy-manager";

/// Annotation holding the replica count a paused workload should come back with
pub const PAUSE_ANNOTATION: &str = "deploy.cloud.sealos.io/pause";

/// Annotation bumped on the pod template to trigger a rolling restart
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

/// Window queried for average utilisation, in minutes
pub const AVERAGE_WINDOW_MINUTES: i64 = 30;

/// Status message timeout in seconds
pub const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 4;
