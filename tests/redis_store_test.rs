//! Needs a Redis server on 127.0.0.1:6379; run with `--ignored`.
use chrono::Utc;
use cluster_node_service::common::cluster::LocalNode;
use cluster_node_service::common::clock::SystemClock;
use cluster_node_service::storage::cluster_store_impl::ClusterStoreImpl;
use cluster_node_service::storage::database_cluster_store::DatabaseClusterStore;
use cluster_node_service::storage::directory_cluster_store::DirectoryClusterStore;
use cluster_node_service::storage::directory_store_impl::DirectoryStoreImpl;
use cluster_node_service::storage::redis::redis_client::RedisClient;
use cluster_node_service::storage::redis::redis_directory_store::RedisDirectoryStore;
use cluster_node_service::storage::redis::redis_table_store::RedisTableStore;
use cluster_node_service::storage::table_store_impl::TableStoreImpl;
use cluster_node_service::traits::cluster_store::ClusterStore;
use std::time::Duration;

const REDIS_URL: &str = "redis://127.0.0.1:6379";

#[tokio::test]
#[ignore]
async fn redis_table_store_round_trip() {
    let client = RedisClient::connect(REDIS_URL).await.unwrap();
    let table = format!("cluster-test-{}", uuid::Uuid::new_v4());
    let store = ClusterStoreImpl::Database(DatabaseClusterStore::new(
        TableStoreImpl::Redis(RedisTableStore::new(client)),
        table,
    ));

    let local = LocalNode::new("redis-node", "hash", &SystemClock);
    store.write(&local.heartbeat(Utc::now())).await.unwrap();
    let nodes = store.read_all().await.unwrap();
    assert!(nodes.contains_key("redis-node"));

    let later = Utc::now() + chrono::Duration::seconds(120);
    let purged = store.purge_older_than(Duration::from_secs(60), later).await.unwrap();
    assert_eq!(purged, 1);
    assert!(store.read_all().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn redis_directory_store_replaces_values() {
    let client = RedisClient::connect(REDIS_URL).await.unwrap();
    let entry = format!("cn=test-{},dc=example", uuid::Uuid::new_v4());
    let store = ClusterStoreImpl::Directory(
        DirectoryClusterStore::new(
            DirectoryStoreImpl::Redis(RedisDirectoryStore::new(client)),
            &entry,
            "clusterState",
        )
        .unwrap(),
    );

    let local = LocalNode::new("redis-node", "hash", &SystemClock);
    let now = Utc::now();
    store.write(&local.heartbeat(now)).await.unwrap();
    store.write(&local.heartbeat(now + chrono::Duration::seconds(5))).await.unwrap();
    let nodes = store.read_all().await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes["redis-node"].timestamp, now + chrono::Duration::seconds(5));

    let purged = store
        .purge_older_than(Duration::from_secs(1), now + chrono::Duration::seconds(60))
        .await
        .unwrap();
    assert_eq!(purged, 1);
}
