use std::time::Duration;

use crate::common::config::{ServerConfig, StorageType};
use crate::common::error::{ClusterError, ClusterResult};

/// Timing of the heartbeat cycle. Fixed for the life of a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterSettings {
    heartbeat_interval: Duration,
    node_timeout: Duration,
    node_purge_interval: Duration,
}

impl ClusterSettings {
    pub fn new(
        heartbeat_interval: Duration,
        node_timeout: Duration,
        node_purge_interval: Duration,
    ) -> ClusterResult<Self> {
        if heartbeat_interval.is_zero() || node_timeout.is_zero() || node_purge_interval.is_zero() {
            return Err(ClusterError::configuration(
                "heartbeat interval, node timeout and purge interval must all be positive",
            ));
        }
        if node_timeout < heartbeat_interval {
            return Err(ClusterError::configuration(format!(
                "node timeout ({:?}) must not be shorter than the heartbeat interval ({:?})",
                node_timeout, heartbeat_interval
            )));
        }
        if node_purge_interval < node_timeout {
            return Err(ClusterError::configuration(format!(
                "node purge interval ({:?}) must not be shorter than the node timeout ({:?})",
                node_purge_interval, node_timeout
            )));
        }
        Ok(Self {
            heartbeat_interval,
            node_timeout,
            node_purge_interval,
        })
    }

    /// Each backend family carries its own three settings; only the family in
    /// use is read.
    pub fn from_config(storage_type: StorageType, config: &ServerConfig) -> ClusterResult<Self> {
        let (heartbeat, timeout, purge) = match storage_type {
            StorageType::Database => (
                config.db_heartbeat_seconds,
                config.db_node_timeout_seconds,
                config.db_node_purge_seconds,
            ),
            StorageType::Directory => (
                config.directory_heartbeat_seconds,
                config.directory_node_timeout_seconds,
                config.directory_node_purge_seconds,
            ),
        };
        Self::new(
            Duration::from_secs(heartbeat),
            Duration::from_secs(timeout),
            Duration::from_secs(purge),
        )
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    pub fn node_timeout(&self) -> Duration {
        self.node_timeout
    }

    pub fn node_purge_interval(&self) -> Duration {
        self.node_purge_interval
    }
}
