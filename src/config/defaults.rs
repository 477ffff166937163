//! Default configuration values
//!
//! Serde default functions for the schema, backed by the crate constants.

use super::schema::Config;
use crate::constants;

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}

pub(super) fn default_false() -> bool {
    false
}

pub(super) fn default_namespace() -> String {
    constants::DEFAULT_NAMESPACE.to_string()
}

pub(super) fn default_full_refresh_ms() -> u64 {
    constants::FULL_REFRESH_MS
}

pub(super) fn default_metrics_refresh_ms() -> u64 {
    constants::METRICS_REFRESH_MS
}

pub(super) fn default_average_refresh_ms() -> u64 {
    constants::AVERAGE_REFRESH_MS
}

pub(super) fn default_concurrency() -> usize {
    constants::METRICS_CONCURRENCY
}

pub(super) fn default_viewport_threshold() -> usize {
    constants::VIEWPORT_MIN_VISIBLE
}

pub(super) fn default_search_debounce_ms() -> u64 {
    constants::SEARCH_DEBOUNCE_MS
}

pub(super) fn default_series_length() -> usize {
    constants::SERIES_LENGTH
}

pub(super) fn default_page_size() -> usize {
    constants::DEFAULT_PAGE_SIZE
}

pub(super) fn default_app_label() -> String {
    constants::APP_DEPLOY_LABEL.to_string()
}

pub(super) fn default_request_timeout_secs() -> u64 {
    10
}
