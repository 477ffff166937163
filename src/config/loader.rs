//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Context-specific config
    /// 3. Root config
    /// 4. Built-in defaults
    pub fn load(context: Option<&str>) -> Result<Config> {
        let mut layers = vec![paths::root_config_path()];
        if let Some(context_name) = context {
            layers.push(paths::context_config_path(context_name));
        }

        let config = Self::load_layers(&layers)?;
        Ok(Self::apply_env_overrides(config))
    }

    /// Merge the given files over the defaults, later files winning
    ///
    /// Missing files are skipped. Files only need to contain the keys they
    /// override; everything else keeps the value from the layers below.
    pub fn load_layers(layers: &[PathBuf]) -> Result<Config> {
        let mut merged = serde_yaml::to_value(Self::load_defaults())
            .context("Failed to serialize default configuration")?;

        for path in layers {
            if !path.exists() {
                tracing::debug!("Config layer not present: {}", path.display());
                continue;
            }
            let overlay = Self::read_value(path)?;
            merge_values(&mut merged, overlay);
            tracing::debug!("Merged config layer: {}", path.display());
        }

        serde_yaml::from_value(merged).context("Failed to build merged configuration")
    }

    fn read_value(path: &Path) -> Result<Value> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let value: Value = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(value)
    }

    /// Load configuration from a single file
    pub fn load_file(path: &PathBuf) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// Fails on invalid YAML syntax, wrong value types, file read errors, and
    /// values the schema rejects (zero concurrency, unsupported page size, ...).
    pub fn validate(context: Option<&str>) -> Result<()> {
        let root_path = paths::root_config_path();
        if root_path.exists() {
            Self::load_file(&root_path)?
                .validate()
                .with_context(|| format!("Invalid config file: {}", root_path.display()))?;
        }

        Self::load(context)
            .context("Failed to load merged configuration")?
            .validate()
            .context("Merged configuration is invalid")?;

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from(
        mut config: Config,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Config {
        if let Some(read_only) = lookup("LAUNCHDECK_READ_ONLY") {
            if let Ok(val) = read_only.parse::<bool>() {
                config.read_only = val;
            }
        }

        if let Some(namespace) = lookup("LAUNCHDECK_DEFAULT_NAMESPACE") {
            if !namespace.is_empty() {
                config.default_namespace = namespace;
            }
        }

        if let Some(url) = lookup("LAUNCHDECK_PROMETHEUS_URL") {
            config.backend.prometheus_url = if url.is_empty() { None } else { Some(url) };
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }

    /// Save context-specific configuration
    pub fn save_context(config: &Config, context: &str) -> Result<()> {
        Self::save(config, &paths::context_config_path(context))
    }
}

/// Recursively merge `overlay` into `base`; mappings merge, everything else replaces
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        // An empty file parses as null and overrides nothing
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(!config.read_only);
        assert_eq!(config.default_namespace, "default");
    }

    #[test]
    fn test_merge_values_is_deep() {
        let mut base: Value =
            serde_yaml::from_str("sync: {concurrency: 3, fullRefreshMs: 3000}").unwrap();
        let overlay: Value = serde_yaml::from_str("sync: {concurrency: 5}").unwrap();
        merge_values(&mut base, overlay);
        assert_eq!(base["sync"]["concurrency"].as_u64(), Some(5));
        assert_eq!(base["sync"]["fullRefreshMs"].as_u64(), Some(3000));
    }

    #[test]
    fn test_env_overrides() {
        let vars = [
            ("LAUNCHDECK_READ_ONLY", "true"),
            ("LAUNCHDECK_DEFAULT_NAMESPACE", "ns-env"),
            ("LAUNCHDECK_PROMETHEUS_URL", "http://prom:9090"),
        ];
        let lookup = |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        };

        let config = ConfigLoader::apply_overrides_from(Config::default(), lookup);
        assert!(config.read_only);
        assert_eq!(config.default_namespace, "ns-env");
        assert_eq!(config.backend.prometheus_url.as_deref(), Some("http://prom:9090"));
    }

    #[test]
    fn test_invalid_bool_override_is_ignored() {
        let config = ConfigLoader::apply_overrides_from(Config::default(), |key| {
            (key == "LAUNCHDECK_READ_ONLY").then(|| "yes".to_string())
        });
        assert!(!config.read_only);
    }
}
