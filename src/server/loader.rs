use crate::common::config::{BackendType, ServerConfig, StorageType};
use crate::common::error::{ClusterError, ClusterResult};
use crate::common::settings::ClusterSettings;
use crate::storage::{
    cluster_store_impl::ClusterStoreImpl,
    database_cluster_store::DatabaseClusterStore,
    directory_cluster_store::DirectoryClusterStore,
    directory_store_impl::DirectoryStoreImpl,
    file::file_directory_store::FileDirectoryStore,
    file::file_table_store::FileTableStore,
    memory::memory_directory_store::MemoryDirectoryStore,
    memory::memory_table_store::MemoryTableStore,
    redis::redis_client::RedisClient,
    redis::redis_directory_store::RedisDirectoryStore,
    redis::redis_table_store::RedisTableStore,
    table_store_impl::TableStoreImpl,
};

const DEFAULT_TABLE_DIR: &str = "./data/cluster";
const DEFAULT_DIRECTORY_FILE: &str = "./data/directory.json";

async fn connect_redis(urls: Option<&String>, what: &str) -> ClusterResult<RedisClient> {
    let urls = urls.ok_or_else(|| {
        ClusterError::configuration(format!("{} Redis URLs not configured", what))
    })?;
    RedisClient::connect(urls).await.map_err(|e| {
        ClusterError::configuration(format!("unable to reach {} Redis at {}: {}", what, urls, e))
    })
}

pub async fn load_table_store(server_config: &ServerConfig) -> ClusterResult<TableStoreImpl> {
    let table_store = match server_config.table_store_type {
        BackendType::Redis => {
            log::debug!("Using Redis table store");
            let client = connect_redis(server_config.table_store_redis_urls.as_ref(), "table store").await?;
            TableStoreImpl::Redis(RedisTableStore::new(client))
        }
        BackendType::File => {
            let path = server_config
                .table_store_file_path
                .clone()
                .unwrap_or_else(|| DEFAULT_TABLE_DIR.to_string());
            log::debug!("Using File table store at {}", path);
            TableStoreImpl::File(FileTableStore::new(path))
        }
        BackendType::Memory => {
            log::debug!("Using in-memory table store");
            TableStoreImpl::Memory(MemoryTableStore::new())
        }
    };
    Ok(table_store)
}

pub async fn load_directory_store(server_config: &ServerConfig) -> ClusterResult<DirectoryStoreImpl> {
    let directory_store = match server_config.directory_store_type {
        BackendType::Redis => {
            log::debug!("Using Redis directory store");
            let client = connect_redis(server_config.directory_store_redis_urls.as_ref(), "directory store").await?;
            DirectoryStoreImpl::Redis(RedisDirectoryStore::new(client))
        }
        BackendType::File => {
            let path = server_config
                .directory_store_file_path
                .clone()
                .unwrap_or_else(|| DEFAULT_DIRECTORY_FILE.to_string());
            log::debug!("Using File directory store at {}", path);
            DirectoryStoreImpl::File(FileDirectoryStore::new(path))
        }
        BackendType::Memory => {
            log::debug!("Using in-memory directory store");
            DirectoryStoreImpl::Memory(MemoryDirectoryStore::new())
        }
    };
    Ok(directory_store)
}

/// Resolves the cluster backend and its timing once for the life of the
/// process. Every failure here is a configuration error.
pub async fn load_cluster_store(server_config: &ServerConfig) -> ClusterResult<(ClusterStoreImpl, ClusterSettings)> {
    if !server_config.cluster_enabled {
        return Err(ClusterError::configuration("cluster service is disabled by configuration"));
    }
    let settings = ClusterSettings::from_config(server_config.storage_type, server_config)?;

    let store = match server_config.storage_type {
        StorageType::Database => {
            let tables = load_table_store(server_config).await?;
            ClusterStoreImpl::Database(DatabaseClusterStore::new(tables, server_config.cluster_table.clone()))
        }
        StorageType::Directory => {
            let test_user = server_config
                .directory_test_user_dn
                .as_deref()
                .filter(|dn| !dn.trim().is_empty())
                .ok_or_else(|| {
                    ClusterError::configuration(
                        "directory cluster storage requires a directory test user to be configured",
                    )
                })?;
            let directory = load_directory_store(server_config).await?;
            ClusterStoreImpl::Directory(DirectoryClusterStore::new(
                directory,
                test_user,
                &server_config.directory_cluster_attribute,
            )?)
        }
    };
    Ok((store, settings))
}
