use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::clock::Clock;
use crate::common::error::{ClusterError, ClusterResult};

/// Prefix carried by every serialized record so the format can evolve.
pub const RECORD_VERSION_PREFIX: &str = "0001#";

/// Heartbeat payload persisted by each instance. Only the instance named by
/// `instance_id` ever writes it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub instance_id: String,
    pub guid: String,
    pub startup_timestamp: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
    pub config_hash: String,
}

impl NodeRecord {
    pub fn encode(&self) -> ClusterResult<String> {
        let json = serde_json::to_string(self)
            .map_err(|e| ClusterError::Serialization(e.to_string()))?;
        Ok(format!("{RECORD_VERSION_PREFIX}{json}"))
    }

    pub fn decode(value: &str) -> ClusterResult<NodeRecord> {
        let json = value.strip_prefix(RECORD_VERSION_PREFIX).ok_or_else(|| {
            ClusterError::Serialization(format!(
                "missing version prefix '{RECORD_VERSION_PREFIX}'"
            ))
        })?;
        serde_json::from_str(json).map_err(|e| ClusterError::Serialization(e.to_string()))
    }

    /// Age of the last heartbeat relative to `now`. Timestamps in the future
    /// (clock skew between hosts) count as zero age.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        let age = now - self.timestamp;
        if age < chrono::Duration::zero() {
            chrono::Duration::zero()
        } else {
            age
        }
    }

    pub fn is_older_than(&self, max_age: std::time::Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => self.age(now) > max_age,
            Err(_) => false,
        }
    }
}

/// Identity of the running process, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNode {
    pub instance_id: String,
    pub guid: String,
    pub startup_timestamp: DateTime<Utc>,
    pub config_hash: String,
}

impl LocalNode {
    pub fn new(instance_id: impl Into<String>, config_hash: impl Into<String>, clock: &dyn Clock) -> Self {
        Self {
            instance_id: instance_id.into(),
            guid: uuid::Uuid::new_v4().to_string(),
            startup_timestamp: clock.now(),
            config_hash: config_hash.into(),
        }
    }

    pub fn heartbeat(&self, now: DateTime<Utc>) -> NodeRecord {
        NodeRecord {
            instance_id: self.instance_id.clone(),
            guid: self.guid.clone(),
            startup_timestamp: self.startup_timestamp,
            timestamp: now,
            config_hash: self.config_hash.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Master,
    Online,
    Offline,
}

/// Read-only view of one cluster member, recomputed on every query.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct NodeView {
    pub instance_id: String,
    pub last_heartbeat: DateTime<Utc>,
    pub startup_time: Option<DateTime<Utc>>,
    pub state: NodeState,
    pub config_matches: bool,
}
