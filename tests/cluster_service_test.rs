mod support;

use cluster_node_service::ClusterService;
use cluster_node_service::common::clock::ManualClock;
use cluster_node_service::common::config::{BackendType, ServerConfig, StorageType};
use cluster_node_service::common::error::ClusterError;
use cluster_node_service::common::settings::ClusterSettings;
use cluster_node_service::server::cluster_service::{HealthStatus, ServiceStatus};
use cluster_node_service::server::loader::load_cluster_store;
use cluster_node_service::storage::memory::memory_table_store::MemoryTableStore;
use std::sync::Arc;
use std::time::Duration;
use support::{database_store, epoch, local_node, secs};

fn memory_config() -> ServerConfig {
    ServerConfig {
        storage_type: StorageType::Database,
        table_store_type: BackendType::Memory,
        directory_store_type: BackendType::Memory,
        ..ServerConfig::default()
    }
}

/// Long heartbeat so only the cycle run at start happens during a test.
fn slow_settings() -> ClusterSettings {
    ClusterSettings::new(
        Duration::from_secs(600),
        Duration::from_secs(1200),
        Duration::from_secs(3600),
    )
    .unwrap()
}

#[tokio::test]
async fn disabled_cluster_closes_the_service() {
    let config = ServerConfig {
        cluster_enabled: false,
        ..memory_config()
    };
    let service = ClusterService::start(&config, local_node("n1", epoch())).await;
    assert_eq!(service.status(), ServiceStatus::Closed);
    assert!(!service.is_master());
    assert!(service.nodes().is_empty());
    assert!(service.statistics().is_none());
    assert!(service.startup_error().unwrap().contains("disabled"));

    let health = service.health_check();
    assert_eq!(health.len(), 1);
    assert_eq!(health[0].status, HealthStatus::Warn);
    service.stop().await;
}

#[tokio::test]
async fn directory_storage_without_test_user_fails_closed() {
    let config = ServerConfig {
        storage_type: StorageType::Directory,
        directory_test_user_dn: None,
        ..memory_config()
    };
    let result = load_cluster_store(&config).await;
    assert!(matches!(result, Err(ClusterError::Configuration(_))));

    let service = ClusterService::start(&config, local_node("n1", epoch())).await;
    assert_eq!(service.status(), ServiceStatus::Closed);
    assert!(service.startup_error().unwrap().contains("test user"));
}

#[tokio::test]
async fn redis_backend_without_urls_is_a_configuration_error() {
    let config = ServerConfig {
        table_store_type: BackendType::Redis,
        table_store_redis_urls: None,
        ..memory_config()
    };
    assert!(matches!(
        load_cluster_store(&config).await,
        Err(ClusterError::Configuration(_))
    ));
}

#[tokio::test]
async fn invalid_timing_is_rejected_at_startup() {
    let config = ServerConfig {
        db_heartbeat_seconds: 60,
        db_node_timeout_seconds: 30,
        ..memory_config()
    };
    assert!(matches!(
        load_cluster_store(&config).await,
        Err(ClusterError::Configuration(_))
    ));

    assert!(ClusterSettings::new(Duration::ZERO, Duration::from_secs(1), Duration::from_secs(1)).is_err());
    assert!(ClusterSettings::new(Duration::from_secs(1), Duration::from_secs(5), Duration::from_secs(4)).is_err());
    assert!(ClusterSettings::new(Duration::from_secs(5), Duration::from_secs(5), Duration::from_secs(5)).is_ok());
}

#[tokio::test]
async fn settings_follow_the_selected_backend_family() {
    let config = ServerConfig {
        db_heartbeat_seconds: 5,
        db_node_timeout_seconds: 15,
        db_node_purge_seconds: 60,
        directory_heartbeat_seconds: 20,
        directory_node_timeout_seconds: 40,
        directory_node_purge_seconds: 80,
        ..memory_config()
    };
    let db = ClusterSettings::from_config(StorageType::Database, &config).unwrap();
    assert_eq!(db.heartbeat_interval(), Duration::from_secs(5));
    assert_eq!(db.node_timeout(), Duration::from_secs(15));
    assert_eq!(db.node_purge_interval(), Duration::from_secs(60));
    let directory = ClusterSettings::from_config(StorageType::Directory, &config).unwrap();
    assert_eq!(directory.heartbeat_interval(), Duration::from_secs(20));
    assert_eq!(directory.node_purge_interval(), Duration::from_secs(80));
}

#[tokio::test]
async fn running_service_answers_from_its_snapshot() {
    let config = ServerConfig {
        db_heartbeat_seconds: 600,
        db_node_timeout_seconds: 1200,
        db_node_purge_seconds: 3600,
        ..memory_config()
    };
    let service = ClusterService::start(&config, local_node("solo", chrono::Utc::now())).await;
    assert_eq!(service.status(), ServiceStatus::Open);
    let mut updates = service.coordinator().unwrap().subscribe();
    tokio::time::timeout(Duration::from_secs(5), updates.wait_for(|s| s.last_read.is_some()))
        .await
        .unwrap()
        .unwrap();

    assert!(service.is_master());
    assert_eq!(service.nodes().len(), 1);
    assert!(service.health_check().is_empty());

    service.stop().await;
    assert_eq!(service.status(), ServiceStatus::Closed);
    assert!(!service.is_master());
    assert!(service.nodes().is_empty());
}

#[tokio::test]
async fn health_check_reports_and_clears_cycle_errors() {
    let tables = MemoryTableStore::new();
    let clock = ManualClock::new(epoch());
    let service = ClusterService::start_with(
        database_store(&tables),
        slow_settings(),
        local_node("n1", epoch()),
        Arc::new(clock.clone()),
    );
    let coordinator = service.coordinator().unwrap();
    let mut updates = coordinator.subscribe();
    tokio::time::timeout(Duration::from_secs(5), updates.wait_for(|s| s.last_read.is_some()))
        .await
        .unwrap()
        .unwrap();
    assert!(service.is_master());
    let nodes_before = service.nodes();

    tables.set_fail_reads(true);
    clock.advance(secs(10));
    assert!(!coordinator.run_cycle().await);
    assert!(service.is_master());
    assert_eq!(service.nodes(), nodes_before);
    let health = service.health_check();
    assert_eq!(health.len(), 1);
    assert_eq!(health[0].status, HealthStatus::Caution);
    assert!(health[0].detail.contains("unavailable"));

    tables.set_fail_reads(false);
    assert!(coordinator.run_cycle().await);
    assert!(service.health_check().is_empty());
    assert_eq!(service.statistics().unwrap().failed_cycles, 1);
    service.stop().await;
}
