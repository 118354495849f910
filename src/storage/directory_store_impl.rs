use crate::storage::file::file_directory_store::FileDirectoryStore;
use crate::storage::memory::memory_directory_store::MemoryDirectoryStore;
use crate::storage::redis::redis_directory_store::RedisDirectoryStore;
use crate::traits::directory_store::DirectoryStore;
use anyhow::Result;

pub enum DirectoryStoreImpl {
    Redis(RedisDirectoryStore),
    File(FileDirectoryStore),
    Memory(MemoryDirectoryStore),
}

impl DirectoryStore for DirectoryStoreImpl {
    async fn read_values(&self, entry: &str, attribute: &str) -> Result<Vec<String>> {
        match self {
            DirectoryStoreImpl::Redis(r) => r.read_values(entry, attribute).await,
            DirectoryStoreImpl::File(f) => f.read_values(entry, attribute).await,
            DirectoryStoreImpl::Memory(m) => m.read_values(entry, attribute).await,
        }
    }

    async fn add_value(&self, entry: &str, attribute: &str, value: &str) -> Result<()> {
        match self {
            DirectoryStoreImpl::Redis(r) => r.add_value(entry, attribute, value).await,
            DirectoryStoreImpl::File(f) => f.add_value(entry, attribute, value).await,
            DirectoryStoreImpl::Memory(m) => m.add_value(entry, attribute, value).await,
        }
    }

    async fn replace_value(&self, entry: &str, attribute: &str, old: &str, new: &str) -> Result<()> {
        match self {
            DirectoryStoreImpl::Redis(r) => r.replace_value(entry, attribute, old, new).await,
            DirectoryStoreImpl::File(f) => f.replace_value(entry, attribute, old, new).await,
            DirectoryStoreImpl::Memory(m) => m.replace_value(entry, attribute, old, new).await,
        }
    }

    async fn delete_value(&self, entry: &str, attribute: &str, value: &str) -> Result<bool> {
        match self {
            DirectoryStoreImpl::Redis(r) => r.delete_value(entry, attribute, value).await,
            DirectoryStoreImpl::File(f) => f.delete_value(entry, attribute, value).await,
            DirectoryStoreImpl::Memory(m) => m.delete_value(entry, attribute, value).await,
        }
    }
}
