use crate::storage::file::file_table_store::FileTableStore;
use crate::storage::memory::memory_table_store::MemoryTableStore;
use crate::storage::redis::redis_table_store::RedisTableStore;
use crate::traits::table_store::{TableCursor, TablePage, TableStore};
use anyhow::Result;

pub enum TableStoreImpl {
    Redis(RedisTableStore),
    File(FileTableStore),
    Memory(MemoryTableStore),
}

impl TableStore for TableStoreImpl {
    async fn put(&self, table: &str, key: &str, value: &str) -> Result<()> {
        match self {
            TableStoreImpl::Redis(r) => r.put(table, key, value).await,
            TableStoreImpl::File(f) => f.put(table, key, value).await,
            TableStoreImpl::Memory(m) => m.put(table, key, value).await,
        }
    }

    async fn remove(&self, table: &str, key: &str) -> Result<bool> {
        match self {
            TableStoreImpl::Redis(r) => r.remove(table, key).await,
            TableStoreImpl::File(f) => f.remove(table, key).await,
            TableStoreImpl::Memory(m) => m.remove(table, key).await,
        }
    }

    async fn scan(&self, table: &str, cursor: TableCursor) -> Result<TablePage> {
        match self {
            TableStoreImpl::Redis(r) => r.scan(table, cursor).await,
            TableStoreImpl::File(f) => f.scan(table, cursor).await,
            TableStoreImpl::Memory(m) => m.scan(table, cursor).await,
        }
    }
}
