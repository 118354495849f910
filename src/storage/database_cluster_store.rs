use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::common::cluster::NodeRecord;
use crate::common::error::{ClusterError, ClusterResult};
use crate::common::utils::{KEY_HASH_LENGTH, truncated_hash};
use crate::storage::table_store_impl::TableStoreImpl;
use crate::traits::cluster_store::ClusterStore;
use crate::traits::table_store::{TableCursor, TableStore};

pub const ROW_KEY_PREFIX: &str = "node-";

/// Cluster state kept as one row per instance in a shared table.
pub struct DatabaseClusterStore {
    tables: TableStoreImpl,
    table: String,
}

impl DatabaseClusterStore {
    pub fn new(tables: TableStoreImpl, table: impl Into<String>) -> Self {
        Self {
            tables,
            table: table.into(),
        }
    }

    pub fn row_key(instance_id: &str) -> String {
        format!("{}{}", ROW_KEY_PREFIX, truncated_hash(instance_id, KEY_HASH_LENGTH))
    }

    /// Walks the table cursor to the end and decodes every node row.
    async fn scan_records(&self, operation: &'static str) -> ClusterResult<Vec<(String, NodeRecord)>> {
        let mut records = Vec::new();
        let mut cursor = TableCursor::Start;
        loop {
            let page = self
                .tables
                .scan(&self.table, cursor)
                .await
                .map_err(|e| ClusterError::storage(operation, e))?;
            for (key, value) in page.rows {
                if !key.starts_with(ROW_KEY_PREFIX) {
                    continue;
                }
                match NodeRecord::decode(&value) {
                    Ok(record) => records.push((key, record)),
                    Err(e) => {
                        log::warn!("Skipping cluster row {} in {}: {}", key, self.table, e);
                    }
                }
            }
            match page.next {
                Some(next) => cursor = next,
                None => break,
            }
        }
        Ok(records)
    }
}

impl ClusterStore for DatabaseClusterStore {
    async fn read_all(&self) -> ClusterResult<BTreeMap<String, NodeRecord>> {
        let mut nodes: BTreeMap<String, NodeRecord> = BTreeMap::new();
        for (_, record) in self.scan_records("read").await? {
            let newer = nodes
                .get(&record.instance_id)
                .is_none_or(|existing| existing.timestamp < record.timestamp);
            if newer {
                nodes.insert(record.instance_id.clone(), record);
            }
        }
        log::debug!("Read {} node records from table {}", nodes.len(), self.table);
        Ok(nodes)
    }

    async fn write(&self, record: &NodeRecord) -> ClusterResult<()> {
        let key = Self::row_key(&record.instance_id);
        let value = record.encode()?;
        self.tables
            .put(&self.table, &key, &value)
            .await
            .map_err(|e| ClusterError::storage("write", e))?;
        log::debug!("Wrote heartbeat for {} to {}/{}", record.instance_id, self.table, key);
        Ok(())
    }

    async fn purge_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> ClusterResult<usize> {
        let mut purged = 0;
        for (key, record) in self.scan_records("purge").await? {
            if !record.is_older_than(max_age, now) {
                continue;
            }
            let removed = self
                .tables
                .remove(&self.table, &key)
                .await
                .map_err(|e| ClusterError::storage("purge", e))?;
            if removed {
                log::debug!("Purged stale node {} (last heartbeat {})", record.instance_id, record.timestamp);
                purged += 1;
            }
        }
        Ok(purged)
    }
}
