//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and resolves the current
//! kubeconfig context, which selects the per-context configuration layer.

use anyhow::{Context, Result};
use kube::config::Kubeconfig;
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to load Kubernetes configuration")?;
    tracing::debug!("Cluster URL: {}", config.cluster_url);
    Client::try_from(config).context("Failed to create Kubernetes client")
}

/// Get the current Kubernetes context name, if a kubeconfig is present
pub fn get_context() -> Option<String> {
    match Kubeconfig::read() {
        Ok(kubeconfig) => kubeconfig.current_context,
        Err(e) => {
            tracing::debug!("No kubeconfig context available: {}", e);
            None
        }
    }
}

/// Namespace configured on the current kubeconfig context
pub fn context_namespace() -> Option<String> {
    let kubeconfig = Kubeconfig::read().ok()?;
    let current = kubeconfig.current_context.as_deref()?;
    kubeconfig
        .contexts
        .iter()
        .find(|named| named.name == current)
        .and_then(|named| named.context.as_ref())
        .and_then(|context| context.namespace.clone())
}

/// Pick the starting namespace
///
/// Precedence: explicit flag, then the kubeconfig context namespace, then the
/// configured default.
pub fn resolve_namespace(
    flag: Option<&str>,
    context_namespace: Option<String>,
    configured: &str,
) -> String {
    flag.filter(|ns| !ns.is_empty())
        .map(str::to_string)
        .or(context_namespace.filter(|ns| !ns.is_empty()))
        .unwrap_or_else(|| configured.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_namespace_precedence() {
        assert_eq!(
            resolve_namespace(Some("ns-flag"), Some("ns-ctx".into()), "default"),
            "ns-flag"
        );
        assert_eq!(
            resolve_namespace(None, Some("ns-ctx".into()), "default"),
            "ns-ctx"
        );
        assert_eq!(resolve_namespace(Some(""), None, "ns-config"), "ns-config");
    }
}
