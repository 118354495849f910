use crate::storage::file::locked_json::{read_locked, update_locked};
use crate::traits::directory_store::DirectoryStore;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// entry -> attribute -> values
type Directory = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Directory entries kept in a single lock-guarded JSON document.
pub struct FileDirectoryStore {
    path: PathBuf,
}

impl FileDirectoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }
}

impl DirectoryStore for FileDirectoryStore {
    async fn read_values(&self, entry: &str, attribute: &str) -> Result<Vec<String>> {
        let directory: Directory = read_locked(&self.path)?;
        Ok(directory
            .get(entry)
            .and_then(|attributes| attributes.get(attribute))
            .cloned()
            .unwrap_or_default())
    }

    async fn add_value(&self, entry: &str, attribute: &str, value: &str) -> Result<()> {
        update_locked(&self.path, |directory: &mut Directory| {
            let values = directory
                .entry(entry.to_string())
                .or_default()
                .entry(attribute.to_string())
                .or_default();
            if values.iter().any(|v| v == value) {
                return ((), false);
            }
            values.push(value.to_string());
            ((), true)
        })
    }

    async fn replace_value(&self, entry: &str, attribute: &str, old: &str, new: &str) -> Result<()> {
        update_locked(&self.path, |directory: &mut Directory| {
            let values = directory
                .entry(entry.to_string())
                .or_default()
                .entry(attribute.to_string())
                .or_default();
            values.retain(|v| v != old && v != new);
            values.push(new.to_string());
            ((), true)
        })
    }

    async fn delete_value(&self, entry: &str, attribute: &str, value: &str) -> Result<bool> {
        update_locked(&self.path, |directory: &mut Directory| {
            let Some(values) = directory
                .get_mut(entry)
                .and_then(|attributes| attributes.get_mut(attribute))
            else {
                return (false, false);
            };
            let before = values.len();
            values.retain(|v| v != value);
            let removed = values.len() != before;
            (removed, removed)
        })
    }
}
