//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use super::defaults::*;
use crate::constants::ALLOWED_PAGE_SIZES;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Disable lifecycle operations (pause/start/restart)
    #[serde(default = "default_false")]
    pub read_only: bool,

    /// Starting namespace
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Refresh cadences and pagination
    #[serde(default)]
    pub sync: SyncConfig,

    /// Cluster and monitoring backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,
}

/// Refresh cadence configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Full list refresh interval
    #[serde(default = "default_full_refresh_ms")]
    pub full_refresh_ms: u64,

    /// Per-workload metrics interval
    #[serde(default = "default_metrics_refresh_ms")]
    pub metrics_refresh_ms: u64,

    /// Average utilisation interval
    #[serde(default = "default_average_refresh_ms")]
    pub average_refresh_ms: u64,

    /// Metric requests in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Visible rows needed before polling is restricted to them
    #[serde(default = "default_viewport_threshold")]
    pub viewport_threshold: usize,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Samples kept per utilisation chart
    #[serde(default = "default_series_length")]
    pub series_length: usize,

    /// One of 10, 20, 50
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Label identifying managed workloads
    #[serde(default = "default_app_label")]
    pub app_label: String,

    /// Prometheus base URL for average utilisation; averages stay empty without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus_url: Option<String>,

    /// HTTP timeout for monitoring requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    /// Enable mouse support
    #[serde(default = "default_false")]
    pub enable_mouse: bool,

    /// Disable Unicode glyphs for compatibility
    #[serde(default = "default_false")]
    pub no_icons: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read_only: default_false(),
            default_namespace: default_namespace(),
            sync: SyncConfig::default(),
            backend: BackendConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            full_refresh_ms: default_full_refresh_ms(),
            metrics_refresh_ms: default_metrics_refresh_ms(),
            average_refresh_ms: default_average_refresh_ms(),
            concurrency: default_concurrency(),
            viewport_threshold: default_viewport_threshold(),
            search_debounce_ms: default_search_debounce_ms(),
            series_length: default_series_length(),
            default_page_size: default_page_size(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            app_label: default_app_label(),
            prometheus_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            enable_mouse: default_false(),
            no_icons: default_false(),
        }
    }
}

impl Config {
    /// Check values serde cannot check
    pub fn validate(&self) -> anyhow::Result<()> {
        let sync = &self.sync;
        if sync.concurrency == 0 {
            anyhow::bail!("sync.concurrency must be at least 1");
        }
        if !ALLOWED_PAGE_SIZES.contains(&sync.default_page_size) {
            anyhow::bail!(
                "sync.defaultPageSize must be one of {:?}, got {}",
                ALLOWED_PAGE_SIZES,
                sync.default_page_size
            );
        }
        if sync.series_length == 0 {
            anyhow::bail!("sync.seriesLength must be at least 1");
        }
        for (key, value) in [
            ("sync.fullRefreshMs", sync.full_refresh_ms),
            ("sync.metricsRefreshMs", sync.metrics_refresh_ms),
            ("sync.averageRefreshMs", sync.average_refresh_ms),
        ] {
            if value == 0 {
                anyhow::bail!("{} must be greater than 0", key);
            }
        }
        if self.default_namespace.trim().is_empty() {
            anyhow::bail!("defaultNamespace must not be empty");
        }
        if let Some(url) = &self.backend.prometheus_url {
            url::Url::parse(url)
                .map_err(|e| anyhow::anyhow!("backend.prometheusUrl is invalid: {}", e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(!config.read_only);
        assert_eq!(config.default_namespace, "default");
        assert_eq!(config.sync.concurrency, 3);
        assert_eq!(config.sync.average_refresh_ms, 120_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("readOnly"));
        assert!(yaml.contains("fullRefreshMs"));
        assert!(!yaml.contains("prometheusUrl"));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
readOnly: true
defaultNamespace: ns-team
sync:
  concurrency: 5
backend:
  prometheusUrl: http://prometheus:9090
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.read_only);
        assert_eq!(config.default_namespace, "ns-team");
        assert_eq!(config.sync.concurrency, 5);
        assert_eq!(config.sync.full_refresh_ms, 3_000);
        assert_eq!(
            config.backend.prometheus_url.as_deref(),
            Some("http://prometheus:9090")
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.sync.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sync.default_page_size = 15;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.backend.prometheus_url = Some("not a url".into());
        assert!(config.validate().is_err());
    }
}
