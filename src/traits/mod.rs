pub mod cluster_store;
pub mod directory_store;
pub mod table_store;
