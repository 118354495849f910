use thiserror::Error;

/// Errors raised by the cluster subsystem.
///
/// `Configuration` is only produced at startup and closes the service for the
/// rest of the process lifetime. `StorageUnavailable` and `Serialization` are
/// produced per heartbeat cycle and never escape the query surface.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cluster configuration error: {0}")]
    Configuration(String),

    #[error("cluster storage unavailable during {operation}: {source}")]
    StorageUnavailable {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("unable to decode stored node record: {0}")]
    Serialization(String),

    #[error("illegal coordinator state: {0}")]
    IllegalState(String),
}

impl ClusterError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ClusterError::Configuration(message.into())
    }

    pub fn storage(operation: &'static str, source: anyhow::Error) -> Self {
        ClusterError::StorageUnavailable { operation, source }
    }
}

pub type ClusterResult<T> = std::result::Result<T, ClusterError>;
