pub mod file {
    pub mod file_directory_store;
    pub mod file_table_store;
    pub mod locked_json;
}
pub mod memory {
    pub mod memory_directory_store;
    pub mod memory_table_store;
}
pub mod redis {
    pub mod redis_client;
    pub mod redis_directory_store;
    pub mod redis_table_store;
}
pub mod cluster_store_impl;
pub mod database_cluster_store;
pub mod directory_cluster_store;
pub mod directory_store_impl;
pub mod table_store_impl;
