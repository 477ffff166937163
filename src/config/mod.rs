//! Configuration system for launchdeck
//!
//! Layered YAML configuration: built-in defaults, the root file, an optional
//! per-context file, then environment overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{BackendConfig, Config, SyncConfig, UiConfig};

use crate::sync::SyncSettings;
use anyhow::Context;
use std::time::Duration;

/// Keys accepted by `config get` / `config set`
pub const CONFIG_KEYS: &[&str] = &[
    "readOnly",
    "defaultNamespace",
    "sync.fullRefreshMs",
    "sync.metricsRefreshMs",
    "sync.averageRefreshMs",
    "sync.concurrency",
    "sync.viewportThreshold",
    "sync.searchDebounceMs",
    "sync.seriesLength",
    "sync.defaultPageSize",
    "backend.appLabel",
    "backend.prometheusUrl",
    "backend.requestTimeoutSecs",
    "ui.enableMouse",
    "ui.noIcons",
];

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            full_refresh: Duration::from_millis(config.full_refresh_ms),
            metrics_refresh: Duration::from_millis(config.metrics_refresh_ms),
            average_refresh: Duration::from_millis(config.average_refresh_ms),
            concurrency: config.concurrency,
            viewport_threshold: config.viewport_threshold,
            search_debounce: Duration::from_millis(config.search_debounce_ms),
        }
    }
}

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    let sync = &config.sync;
    let value = match key {
        "readOnly" => config.read_only.to_string(),
        "defaultNamespace" => config.default_namespace.clone(),
        "sync.fullRefreshMs" => sync.full_refresh_ms.to_string(),
        "sync.metricsRefreshMs" => sync.metrics_refresh_ms.to_string(),
        "sync.averageRefreshMs" => sync.average_refresh_ms.to_string(),
        "sync.concurrency" => sync.concurrency.to_string(),
        "sync.viewportThreshold" => sync.viewport_threshold.to_string(),
        "sync.searchDebounceMs" => sync.search_debounce_ms.to_string(),
        "sync.seriesLength" => sync.series_length.to_string(),
        "sync.defaultPageSize" => sync.default_page_size.to_string(),
        "backend.appLabel" => config.backend.app_label.clone(),
        "backend.prometheusUrl" => config.backend.prometheus_url.clone().unwrap_or_default(),
        "backend.requestTimeoutSecs" => config.backend.request_timeout_secs.to_string(),
        "ui.enableMouse" => config.ui.enable_mouse.to_string(),
        "ui.noIcons" => config.ui.no_icons.to_string(),
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    };
    Ok(value)
}

/// Set a configuration value by key (dot notation)
///
/// The updated configuration is validated; on error `config` is unchanged.
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    let mut next = config.clone();
    let sync = &mut next.sync;
    match key {
        "readOnly" => {
            next.read_only = value
                .parse()
                .context("readOnly must be 'true' or 'false'")?;
        }
        "defaultNamespace" => next.default_namespace = value.to_string(),
        "sync.fullRefreshMs" => {
            sync.full_refresh_ms = value.parse().context("sync.fullRefreshMs must be a number")?;
        }
        "sync.metricsRefreshMs" => {
            sync.metrics_refresh_ms = value
                .parse()
                .context("sync.metricsRefreshMs must be a number")?;
        }
        "sync.averageRefreshMs" => {
            sync.average_refresh_ms = value
                .parse()
                .context("sync.averageRefreshMs must be a number")?;
        }
        "sync.concurrency" => {
            sync.concurrency = value.parse().context("sync.concurrency must be a number")?;
        }
        "sync.viewportThreshold" => {
            sync.viewport_threshold = value
                .parse()
                .context("sync.viewportThreshold must be a number")?;
        }
        "sync.searchDebounceMs" => {
            sync.search_debounce_ms = value
                .parse()
                .context("sync.searchDebounceMs must be a number")?;
        }
        "sync.seriesLength" => {
            sync.series_length = value.parse().context("sync.seriesLength must be a number")?;
        }
        "sync.defaultPageSize" => {
            sync.default_page_size = value
                .parse()
                .context("sync.defaultPageSize must be a number")?;
        }
        "backend.appLabel" => next.backend.app_label = value.to_string(),
        "backend.prometheusUrl" => {
            next.backend.prometheus_url = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        "backend.requestTimeoutSecs" => {
            next.backend.request_timeout_secs = value
                .parse()
                .context("backend.requestTimeoutSecs must be a number")?;
        }
        "ui.enableMouse" => {
            next.ui.enable_mouse = value
                .parse()
                .context("ui.enableMouse must be 'true' or 'false'")?;
        }
        "ui.noIcons" => {
            next.ui.no_icons = value
                .parse()
                .context("ui.noIcons must be 'true' or 'false'")?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    next.validate()?;
    *config = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_is_readable() {
        let config = Config::default();
        for key in CONFIG_KEYS {
            assert!(get_config_value(&config, key).is_ok(), "key {}", key);
        }
        assert!(get_config_value(&config, "ui.skin").is_err());
    }

    #[test]
    fn test_set_then_get() {
        let mut config = Config::default();
        set_config_value(&mut config, "sync.concurrency", "6").unwrap();
        assert_eq!(get_config_value(&config, "sync.concurrency").unwrap(), "6");

        set_config_value(&mut config, "backend.prometheusUrl", "http://prom:9090").unwrap();
        set_config_value(&mut config, "backend.prometheusUrl", "").unwrap();
        assert!(config.backend.prometheus_url.is_none());
    }

    #[test]
    fn test_set_rejects_invalid_value() {
        let mut config = Config::default();
        assert!(set_config_value(&mut config, "sync.concurrency", "0").is_err());
        assert!(set_config_value(&mut config, "sync.defaultPageSize", "25").is_err());
        assert!(set_config_value(&mut config, "readOnly", "maybe").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_sync_settings_from_config() {
        let settings = SyncSettings::from(&SyncConfig::default());
        assert_eq!(settings, SyncSettings::default());
    }
}
