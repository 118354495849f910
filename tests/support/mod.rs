#![allow(dead_code)]

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use cluster_node_service::common::clock::ManualClock;
use cluster_node_service::common::cluster::{LocalNode, NodeRecord};
use cluster_node_service::common::settings::ClusterSettings;
use cluster_node_service::server::cluster_heartbeat::ClusterCoordinator;
use cluster_node_service::storage::cluster_store_impl::ClusterStoreImpl;
use cluster_node_service::storage::database_cluster_store::DatabaseClusterStore;
use cluster_node_service::storage::directory_cluster_store::DirectoryClusterStore;
use cluster_node_service::storage::directory_store_impl::DirectoryStoreImpl;
use cluster_node_service::storage::memory::memory_directory_store::MemoryDirectoryStore;
use cluster_node_service::storage::memory::memory_table_store::MemoryTableStore;
use cluster_node_service::storage::table_store_impl::TableStoreImpl;
use std::sync::Arc;
use std::time::Duration;

pub const TABLE: &str = "CLUSTER_STATE";
pub const TEST_USER: &str = "cn=proxy-test,ou=people,dc=example,dc=com";
pub const ATTRIBUTE: &str = "clusterState";
pub const CONFIG_HASH: &str = "config-a";

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn secs(n: i64) -> ChronoDuration {
    ChronoDuration::seconds(n)
}

/// heartbeat 10s, timeout 30s, purge 300s
pub fn settings() -> ClusterSettings {
    ClusterSettings::new(
        Duration::from_secs(10),
        Duration::from_secs(30),
        Duration::from_secs(300),
    )
    .unwrap()
}

pub fn local_node(id: &str, started: DateTime<Utc>) -> LocalNode {
    LocalNode {
        instance_id: id.to_string(),
        guid: format!("guid-{id}"),
        startup_timestamp: started,
        config_hash: CONFIG_HASH.to_string(),
    }
}

pub fn record(id: &str, started: DateTime<Utc>, heartbeat: DateTime<Utc>) -> NodeRecord {
    local_node(id, started).heartbeat(heartbeat)
}

pub fn database_store(tables: &MemoryTableStore) -> ClusterStoreImpl {
    ClusterStoreImpl::Database(DatabaseClusterStore::new(
        TableStoreImpl::Memory(tables.clone()),
        TABLE,
    ))
}

pub fn directory_store(directory: &MemoryDirectoryStore) -> ClusterStoreImpl {
    ClusterStoreImpl::Directory(
        DirectoryClusterStore::new(DirectoryStoreImpl::Memory(directory.clone()), TEST_USER, ATTRIBUTE)
            .unwrap(),
    )
}

pub fn coordinator(tables: &MemoryTableStore, clock: &ManualClock, local: LocalNode) -> ClusterCoordinator {
    ClusterCoordinator::with_clock(database_store(tables), settings(), local, Arc::new(clock.clone()))
}
