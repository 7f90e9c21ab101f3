//! Error types for asset collection

use thiserror::Error;

/// Errors that abort a collection pass
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to list {kind} in {scope}: {source}")]
    Listing {
        kind: &'static str,
        scope: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Failed to publish asset {ean}: {source}")]
    Publish {
        ean: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Result type alias for collectors
pub type Result<T> = std::result::Result<T, CollectError>;
