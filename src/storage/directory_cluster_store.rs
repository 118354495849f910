use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::common::cluster::NodeRecord;
use crate::common::error::{ClusterError, ClusterResult};
use crate::storage::directory_store_impl::DirectoryStoreImpl;
use crate::traits::cluster_store::ClusterStore;
use crate::traits::directory_store::DirectoryStore;

/// Cluster state kept as values of one multi-valued attribute on the
/// directory test identity. Every instance can read that entry through the
/// proxy account, so it doubles as the shared store.
pub struct DirectoryClusterStore {
    directory: DirectoryStoreImpl,
    entry: String,
    attribute: String,
}

impl DirectoryClusterStore {
    /// `entry` must name an existing identity; an empty value is rejected.
    pub fn new(directory: DirectoryStoreImpl, entry: &str, attribute: &str) -> ClusterResult<Self> {
        if entry.trim().is_empty() {
            return Err(ClusterError::configuration(
                "directory cluster storage requires a directory test user to be configured",
            ));
        }
        if attribute.trim().is_empty() {
            return Err(ClusterError::configuration(
                "directory cluster storage requires a cluster attribute name",
            ));
        }
        Ok(Self {
            directory,
            entry: entry.trim().to_string(),
            attribute: attribute.trim().to_string(),
        })
    }

    /// Raw attribute values paired with their decoded records.
    async fn read_records(&self, operation: &'static str) -> ClusterResult<Vec<(String, NodeRecord)>> {
        let values = self
            .directory
            .read_values(&self.entry, &self.attribute)
            .await
            .map_err(|e| ClusterError::storage(operation, e))?;
        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match NodeRecord::decode(&value) {
                Ok(record) => records.push((value, record)),
                Err(e) => {
                    log::warn!("Skipping value of {} on {}: {}", self.attribute, self.entry, e);
                }
            }
        }
        Ok(records)
    }
}

impl ClusterStore for DirectoryClusterStore {
    async fn read_all(&self) -> ClusterResult<BTreeMap<String, NodeRecord>> {
        let mut nodes: BTreeMap<String, NodeRecord> = BTreeMap::new();
        for (_, record) in self.read_records("read").await? {
            let newer = nodes
                .get(&record.instance_id)
                .is_none_or(|existing| existing.timestamp < record.timestamp);
            if newer {
                nodes.insert(record.instance_id.clone(), record);
            }
        }
        log::debug!("Read {} node records from {}", nodes.len(), self.entry);
        Ok(nodes)
    }

    async fn write(&self, record: &NodeRecord) -> ClusterResult<()> {
        let new_value = record.encode()?;
        let mut own_values = self
            .read_records("write")
            .await?
            .into_iter()
            .filter(|(_, r)| r.instance_id == record.instance_id)
            .map(|(value, _)| value);

        match own_values.next() {
            Some(old_value) => {
                self.directory
                    .replace_value(&self.entry, &self.attribute, &old_value, &new_value)
                    .await
                    .map_err(|e| ClusterError::storage("write", e))?;
            }
            None => {
                self.directory
                    .add_value(&self.entry, &self.attribute, &new_value)
                    .await
                    .map_err(|e| ClusterError::storage("write", e))?;
            }
        }

        // leftovers from an interrupted earlier update
        for duplicate in own_values {
            if duplicate == new_value {
                continue;
            }
            self.directory
                .delete_value(&self.entry, &self.attribute, &duplicate)
                .await
                .map_err(|e| ClusterError::storage("write", e))?;
        }
        log::debug!("Wrote heartbeat for {} to {}", record.instance_id, self.entry);
        Ok(())
    }

    async fn purge_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> ClusterResult<usize> {
        let mut purged = 0;
        for (value, record) in self.read_records("purge").await? {
            if !record.is_older_than(max_age, now) {
                continue;
            }
            let removed = self
                .directory
                .delete_value(&self.entry, &self.attribute, &value)
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
