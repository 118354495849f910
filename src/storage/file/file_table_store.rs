use crate::storage::file::locked_json::{read_locked, update_locked};
use crate::traits::table_store::{TableCursor, TablePage, TableStore};
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

type Table = BTreeMap<String, String>;

/// One JSON file per table under `base_dir`, shared between processes on the
/// same host through advisory file locks.
pub struct FileTableStore {
    base_dir: PathBuf,
}

impl FileTableStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_owned(),
        }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.base_dir.join(format!("{table}.json"))
    }
}

impl TableStore for FileTableStore {
    async fn put(&self, table: &str, key: &str, value: &str) -> Result<()> {
        update_locked(&self.table_path(table), |rows: &mut Table| {
            rows.insert(key.to_string(), value.to_string());
            ((), true)
        })
    }

    async fn remove(&self, table: &str, key: &str) -> Result<bool> {
        update_locked(&self.table_path(table), |rows: &mut Table| {
            let removed = rows.remove(key).is_some();
            (removed, removed)
        })
    }

    /// The whole file is one page.
    async fn scan(&self, table: &str, _cursor: TableCursor) -> Result<TablePage> {
        let rows: Table = read_locked(&self.table_path(table))?;
        Ok(TablePage {
            rows: rows.into_iter().collect(),
            next: None,
        })
    }
}
