use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::common::cluster::NodeRecord;
use crate::common::error::ClusterResult;
use crate::storage::database_cluster_store::DatabaseClusterStore;
use crate::storage::directory_cluster_store::DirectoryClusterStore;
use crate::traits::cluster_store::ClusterStore;

/// The two supported cluster state backends. Chosen once by the loader.
pub enum ClusterStoreImpl {
    Database(DatabaseClusterStore),
    Directory(DirectoryClusterStore),
}

impl ClusterStoreImpl {
    pub fn kind(&self) -> &'static str {
        match self {
            ClusterStoreImpl::Database(_) => "database",
            ClusterStoreImpl::Directory(_) => "directory",
        }
    }
}

impl ClusterStore for ClusterStoreImpl {
    async fn read_all(&self) -> ClusterResult<BTreeMap<String, NodeRecord>> {
        match self {
            ClusterStoreImpl::Database(d) => d.read_all().await,
            ClusterStoreImpl::Directory(l) => l.read_all().await,
        }
    }

    async fn write(&self, record: &NodeRecord) -> ClusterResult<()> {
        match self {
            ClusterStoreImpl::Database(d) => d.write(record).await,
            ClusterStoreImpl::Directory(l) => l.write(record).await,
        }
    }

    async fn purge_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> ClusterResult<usize> {
        match self {
            ClusterStoreImpl::Database(d) => d.purge_older_than(max_age, now).await,
            ClusterStoreImpl::Directory(l) => l.purge_older_than(max_age, now).await,
        }
    }
}
