use serde::Serialize;
use std::sync::Arc;

use crate::common::clock::Clock;
use crate::common::cluster::{LocalNode, NodeView};
use crate::common::config::ServerConfig;
use crate::common::error::ClusterError;
use crate::common::settings::ClusterSettings;
use crate::server::cluster_heartbeat::{ClusterCoordinator, ClusterStatistics, CoordinatorState};
use crate::server::loader::load_cluster_store;
use crate::storage::cluster_store_impl::ClusterStoreImpl;

pub const HEALTH_TOPIC: &str = "Cluster";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Warn,
    Caution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthRecord {
    pub status: HealthStatus,
    pub topic: String,
    pub detail: String,
}

/// Entry point for the rest of the application. Queries never fail: a
/// service that could not start answers "not master" with no nodes, and a
/// running one answers from its last good snapshot.
pub struct ClusterService {
    coordinator: Option<ClusterCoordinator>,
    startup_error: Option<String>,
}

impl ClusterService {
    /// Builds the configured backend and starts heartbeating. Startup
    /// problems close the service instead of failing the caller.
    pub async fn start(server_config: &ServerConfig, local: LocalNode) -> Self {
        match load_cluster_store(server_config).await {
            Ok((store, settings)) => Self::start_with_coordinator(ClusterCoordinator::new(store, settings, local)),
            Err(e) => Self::closed(e),
        }
    }

    pub fn start_with(
        store: ClusterStoreImpl,
        settings: ClusterSettings,
        local: LocalNode,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::start_with_coordinator(ClusterCoordinator::with_clock(store, settings, local, clock))
    }

    fn start_with_coordinator(coordinator: ClusterCoordinator) -> Self {
        if let Err(e) = coordinator.start() {
            return Self::closed(e);
        }
        log::info!("Cluster service opened for instance {}", coordinator.local_node().instance_id);
        Self {
            coordinator: Some(coordinator),
            startup_error: None,
        }
    }

    pub fn closed(error: ClusterError) -> Self {
        log::error!("Cluster service closed: {}", error);
        Self {
            coordinator: None,
            startup_error: Some(error.to_string()),
        }
    }

    pub async fn stop(&self) {
        if let Some(coordinator) = &self.coordinator {
            coordinator.stop().await;
        }
    }

    pub fn status(&self) -> ServiceStatus {
        match &self.coordinator {
            Some(c) if c.state() == CoordinatorState::Started => ServiceStatus::Open,
            _ => ServiceStatus::Closed,
        }
    }

    pub fn startup_error(&self) -> Option<&str> {
        self.startup_error.as_deref()
    }

    /// False whenever this instance is not actively heartbeating.
    pub fn is_master(&self) -> bool {
        match &self.coordinator {
            Some(c) if c.state() == CoordinatorState::Started => c.is_master(),
            _ => false,
        }
    }

    /// Empty unless the service is open; a stopped instance does not report
    /// a membership it no longer takes part in.
    pub fn nodes(&self) -> Vec<NodeView> {
        match &self.coordinator {
            Some(c) if c.state() == CoordinatorState::Started => c.nodes(),
            _ => Vec::new(),
        }
    }

    /// At most one record: the startup error of a closed service or the
    /// error of the last heartbeat cycle.
    pub fn health_check(&self) -> Vec<HealthRecord> {
        let Some(coordinator) = &self.coordinator else {
            let detail = self
                .startup_error
                .clone()
                .unwrap_or_else(|| "cluster service is not running".to_string());
            return vec![HealthRecord {
                status: HealthStatus::Warn,
                topic: HEALTH_TOPIC.to_string(),
                detail: format!("cluster service is closed: {}", detail),
            }];
        };
        match coordinator.last_error() {
            Some(error) => vec![HealthRecord {
                status: HealthStatus::Caution,
                topic: HEALTH_TOPIC.to_string(),
                detail: format!("cluster heartbeat failed at {}: {}", error.at, error.message),
            }],
            None => Vec::new(),
        }
    }

    pub fn statistics(&self) -> Option<ClusterStatistics> {
        self.coordinator.as_ref().map(|c| c.statistics())
    }

    pub fn coordinator(&self) -> Option<&ClusterCoordinator> {
        self.coordinator.as_ref()
    }
}
