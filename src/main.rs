use cluster_node_service::ClusterService;
use cluster_node_service::common::clock::SystemClock;
use cluster_node_service::common::cluster::LocalNode;
use cluster_node_service::common::config::{app_config_hash, load_server_config};
use cluster_node_service::common::settings::ClusterSettings;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "config/app.json".to_string());

    let server_config = load_server_config()?;
    let local = LocalNode::new(
        server_config.resolve_instance_id(),
        app_config_hash(&config_path)?,
        &SystemClock,
    );
    log::info!(
        "Starting cluster node {} (guid {}, config hash {})",
        local.instance_id, local.guid, local.config_hash
    );

    let report_every = ClusterSettings::from_config(server_config.storage_type, &server_config)
        .map(|s| s.heartbeat_interval())
        .unwrap_or(Duration::from_secs(30));
    let service = ClusterService::start(&server_config, local).await;

    let mut ticker = tokio::time::interval(report_every);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                for record in service.health_check() {
                    log::warn!("{:?} [{}] {}", record.status, record.topic, record.detail);
                }
                log::info!("master: {}, nodes: {}", service.is_master(), serde_json::to_string(&service.nodes())?);
            }
        }
    }

    service.stop().await;
    Ok(())
}
