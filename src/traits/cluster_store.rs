use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::common::cluster::NodeRecord;
use crate::common::error::ClusterResult;

/// Shared persistence for node heartbeats.
///
/// Implementations never retry; a failed call surfaces as
/// `ClusterError::StorageUnavailable` and the heartbeat schedule decides when
/// to try again.
#[trait_variant::make(ClusterStore: Send)]
pub trait UnsendClusterStore {
    /// Full snapshot keyed by instance id. Records that cannot be decoded are
    /// skipped.
    async fn read_all(&self) -> ClusterResult<BTreeMap<String, NodeRecord>>;

    /// Upserts the caller's own record.
    async fn write(&self, record: &NodeRecord) -> ClusterResult<()>;

    /// Deletes every record whose heartbeat is older than `max_age` at `now`
    /// and returns how many were removed.
    async fn purge_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> ClusterResult<usize>;
}
