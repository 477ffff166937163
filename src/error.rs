//! Domain errors for the workload list and its backends
//!
//! Application plumbing (config, CLI, client setup) uses `anyhow`. Everything the
//! synchronizer has to classify goes through [`DeckError`].

/// Errors surfaced by backends and the synchronization core
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeckError {
    /// Network unreachable, connection reset or request timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with a failure status or an unusable payload
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The caller broke a contract (page out of range, zero concurrency, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DeckError {
    pub fn invalid(message: impl Into<String>) -> Self {
        DeckError::InvalidArgument(message.into())
    }

    /// Whether retrying on the next tick can reasonably succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, DeckError::Transport(_))
    }
}

impl From<kube::Error> for DeckError {
    fn from(err: kube::Error) -> Self {
        match &err {
            kube::Error::Api(_) => DeckError::Upstream(err.to_string()),
            _ => DeckError::Transport(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DeckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_status() {
            DeckError::Upstream(err.to_string())
        } else {
            DeckError::Transport(err.to_string())
        }
    }
}

/// Result type for the synchronization core
pub type DeckResult<T> = Result<T, DeckError>;
