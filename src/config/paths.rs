//! Cross-platform directory path resolution
//!
//! - Linux/macOS: XDG Base Directory specification (~/.config, ~/.local/share)
//! - Windows: Known Folder API (AppData\Roaming, AppData\Local)

use std::path::{Path, PathBuf};

const APP_DIR: &str = "launchdeck";

/// Get the configuration directory path
///
/// Checks LAUNCHDECK_CONFIG_DIR first, then falls back to:
/// - Unix (Linux/macOS): XDG_CONFIG_HOME/launchdeck or ~/.config/launchdeck
/// - Windows: %APPDATA%\launchdeck\config
pub fn config_dir() -> PathBuf {
    std::env::var("LAUNCHDECK_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(windows)]
            {
                use directories::ProjectDirs;
                ProjectDirs::from("", "", APP_DIR)
                    .map(|dirs| dirs.config_dir().to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_DIR))
            }
            #[cfg(not(windows))]
            {
                use directories::BaseDirs;
                std::env::var("XDG_CONFIG_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        BaseDirs::new()
                            .map(|dirs| dirs.home_dir().join(".config"))
                            .unwrap_or_else(|| PathBuf::from(".").join(".config"))
                    })
                    .join(APP_DIR)
            }
        })
}

/// Get the data directory path (per-context overrides live here)
///
/// Checks LAUNCHDECK_DATA_DIR first, then the platform data directory.
pub fn data_dir() -> PathBuf {
    std::env::var("LAUNCHDECK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(windows)]
            {
                use directories::ProjectDirs;
                ProjectDirs::from("", "", APP_DIR)
                    .map(|dirs| dirs.data_dir().to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".").join(".local").join("share").join(APP_DIR))
            }
            #[cfg(not(windows))]
            {
                use directories::BaseDirs;
                std::env::var("XDG_DATA_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        BaseDirs::new()
                            .map(|dirs| dirs.home_dir().join(".local").join("share"))
                            .unwrap_or_else(|| PathBuf::from(".").join(".local").join("share"))
                    })
                    .join(APP_DIR)
            }
        })
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Get the kube-context specific config file path
pub fn context_config_path(context: &str) -> PathBuf {
    data_dir()
        .join("contexts")
        .join(sanitize(context))
        .join("config.yaml")
}

/// Context names may contain ':' and '/' (e.g. EKS ARNs)
fn sanitize(context: &str) -> String {
    context
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_path_is_sanitized() {
        let path = context_config_path("arn:aws:eks:eu-west-1:123:cluster/prod");
        let dir = path.parent().unwrap().file_name().unwrap().to_string_lossy();
        assert_eq!(dir, "arn_aws_eks_eu-west-1_123_cluster_prod");
    }

    #[test]
    fn test_root_config_file_name() {
        assert_eq!(root_config_path().file_name().unwrap(), "config.yaml");
    }
}
