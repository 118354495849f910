use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::io::ErrorKind::NotFound;
use anyhow::Result;

use crate::common::utils::config_hash;

pub const ENV_PREFIX: &str = "CLUSTER_NODE";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Database,
    Directory,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    Redis,
    File,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub cluster_enabled: bool,
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default = "default_storage_type")]
    pub storage_type: StorageType,

    #[serde(default = "default_backend_type")]
    pub table_store_type: BackendType,
    #[serde(default)]
    pub table_store_redis_urls: Option<String>,
    #[serde(default)]
    pub table_store_file_path: Option<String>,
    #[serde(default = "default_cluster_table")]
    pub cluster_table: String,

    #[serde(default = "default_backend_type")]
    pub directory_store_type: BackendType,
    #[serde(default)]
    pub directory_store_redis_urls: Option<String>,
    #[serde(default)]
    pub directory_store_file_path: Option<String>,
    #[serde(default)]
    pub directory_test_user_dn: Option<String>,
    #[serde(default = "default_cluster_attribute")]
    pub directory_cluster_attribute: String,

    #[serde(default = "default_db_heartbeat_seconds")]
    pub db_heartbeat_seconds: u64,
    #[serde(default = "default_db_node_timeout_seconds")]
    pub db_node_timeout_seconds: u64,
    #[serde(default = "default_node_purge_seconds")]
    pub db_node_purge_seconds: u64,

    #[serde(default = "default_directory_heartbeat_seconds")]
    pub directory_heartbeat_seconds: u64,
    #[serde(default = "default_directory_node_timeout_seconds")]
    pub directory_node_timeout_seconds: u64,
    #[serde(default = "default_node_purge_seconds")]
    pub directory_node_purge_seconds: u64,
}

fn default_true() -> bool { true }
fn default_storage_type() -> StorageType { StorageType::Database }
fn default_backend_type() -> BackendType { BackendType::Redis }
fn default_cluster_table() -> String { "CLUSTER_STATE".to_string() }
fn default_cluster_attribute() -> String { "clusterState".to_string() }
fn default_db_heartbeat_seconds() -> u64 { 30 }
fn default_db_node_timeout_seconds() -> u64 { 300 }
fn default_directory_heartbeat_seconds() -> u64 { 60 }
fn default_directory_node_timeout_seconds() -> u64 { 600 }
fn default_node_purge_seconds() -> u64 { 86_400 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cluster_enabled: true,
            instance_id: None,
            storage_type: default_storage_type(),
            table_store_type: default_backend_type(),
            table_store_redis_urls: None,
            table_store_file_path: None,
            cluster_table: default_cluster_table(),
            directory_store_type: default_backend_type(),
            directory_store_redis_urls: None,
            directory_store_file_path: None,
            directory_test_user_dn: None,
            directory_cluster_attribute: default_cluster_attribute(),
            db_heartbeat_seconds: default_db_heartbeat_seconds(),
            db_node_timeout_seconds: default_db_node_timeout_seconds(),
            db_node_purge_seconds: default_node_purge_seconds(),
            directory_heartbeat_seconds: default_directory_heartbeat_seconds(),
            directory_node_timeout_seconds: default_directory_node_timeout_seconds(),
            directory_node_purge_seconds: default_node_purge_seconds(),
        }
    }
}

impl ServerConfig {
    /// Configured instance id, or a random one that stays fixed for the
    /// life of this config value's owner.
    pub fn resolve_instance_id(&self) -> String {
        match &self.instance_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => {
                let mut id = uuid::Uuid::new_v4().simple().to_string();
                id.truncate(12);
                id
            }
        }
    }
}

/// Loads the server settings from `config/server.*` (optional) overlaid with
/// `CLUSTER_NODE_*` environment variables. A `.env` file is honoured.
pub fn load_server_config() -> Result<ServerConfig> {
    dotenv::dotenv().ok();
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server").required(false))
        // values stay strings until deserialized, so ids like "007" survive
        .add_source(config::Environment::with_prefix(ENV_PREFIX).prefix_separator("_"))
        .build()?;
    let server_config: ServerConfig = settings.try_deserialize()?;
    Ok(server_config)
}

/// Loads the application configuration whose digest identifies this
/// instance's effective configuration. A missing file is an empty document.
pub fn load_app_config(path: &str) -> Result<Value> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == NotFound => {
            log::warn!("Application config {} not found, hashing empty configuration", path);
            return Ok(Value::Object(serde_json::Map::new()));
        }
        Err(e) => return Err(e.into()),
    };
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}

pub fn app_config_hash(path: &str) -> Result<String> {
    Ok(config_hash(&load_app_config(path)?))
}
