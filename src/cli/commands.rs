//! Configuration command handlers

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{CONFIG_KEYS, ConfigLoader, paths};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "readOnly", "sync.concurrency")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "readOnly", "sync.concurrency")
        key: String,
        /// Configuration value
        value: String,
        /// Kube context name for a context-specific override
        #[arg(long)]
        context: Option<String>,
    },
    /// List all configuration
    List,
    /// List the keys accepted by get and set
    Keys,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
///
/// `context` is the current kube context; it selects the context layer when
/// reading.
pub fn handle_config_command(cmd: ConfigSubcommand, context: Option<&str>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load(context).context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = crate::config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set {
            key,
            value,
            context: target_context,
        } => {
            // Write back only the layer being edited, not the merged view
            let path = match &target_context {
                Some(name) => paths::context_config_path(name),
                None => paths::root_config_path(),
            };
            let mut config = if path.exists() {
                ConfigLoader::load_file(&path)?
            } else {
                ConfigLoader::load_defaults()
            };

            crate::config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;

            match target_context {
                Some(name) => {
                    ConfigLoader::save_context(&config, &name)
                        .context("Failed to save context configuration")?;
                    println!("Configuration saved for context: {}", name);
                }
                None => {
                    ConfigLoader::save_root(&config).context("Failed to save configuration")?;
                    println!("Configuration saved");
                }
            }
        }
        ConfigSubcommand::List => {
            let config = ConfigLoader::load(context).context("Failed to load configuration")?;
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Keys => {
            for key in CONFIG_KEYS {
                println!("{}", key);
            }
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
            if let Some(name) = context {
                println!("{}", paths::context_config_path(name).display());
            }
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::validate(context).context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
