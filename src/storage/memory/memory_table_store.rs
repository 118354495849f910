use crate::traits::table_store::{TableCursor, TablePage, TableStore};
use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    tables: Mutex<HashMap<String, BTreeMap<String, String>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    latency_millis: AtomicU64,
}

/// Process-local tables. Clones share state, which lets several coordinators
/// in one process behave like instances sharing a database.
#[derive(Clone, Default)]
pub struct MemoryTableStore {
    inner: Arc<Inner>,
    page_size: usize,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans return at most `page_size` rows per call and hand back a cursor
    /// for the rest. Zero means a single page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// While set, `scan` fails as if the backend were unreachable.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// While set, `put` and `remove` fail as if the backend were unreachable.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delays every operation, like a slow network round trip.
    pub fn set_latency(&self, latency: Duration) {
        self.inner
            .latency_millis
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn round_trip(&self) {
        let millis = self.inner.latency_millis.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    fn check_reads(&self) -> Result<()> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("memory table store: reads unavailable"));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("memory table store: writes unavailable"));
        }
        Ok(())
    }
}

impl TableStore for MemoryTableStore {
    async fn put(&self, table: &str, key: &str, value: &str) -> Result<()> {
        self.round_trip().await;
        self.check_writes()?;
        let mut tables = self.inner.tables.lock().await;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, table: &str, key: &str) -> Result<bool> {
        self.round_trip().await;
        self.check_writes()?;
        let mut tables = self.inner.tables.lock().await;
        Ok(tables
            .get_mut(table)
            .map(|rows| rows.remove(key).is_some())
            .unwrap_or(false))
    }

    /// Cursor positions are the last key of the previous page.
    async fn scan(&self, table: &str, cursor: TableCursor) -> Result<TablePage> {
        self.round_trip().await;
        self.check_reads()?;
        let tables = self.inner.tables.lock().await;
        let Some(rows) = tables.get(table) else {
            return Ok(TablePage::default());
        };
        let start = match cursor {
            TableCursor::Start => Bound::Unbounded,
            TableCursor::Next(after) => Bound::Excluded(after),
        };
        let limit = if self.page_size == 0 { usize::MAX } else { self.page_size };
        let mut page: Vec<(String, String)> = rows
            .range::<String, _>((start, Bound::Unbounded))
            .take(limit.saturating_add(1))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let next = if page.len() > limit {
            page.truncate(limit);
            page.last().map(|(key, _)| TableCursor::Next(key.clone()))
        } else {
            None
        };
        Ok(TablePage { rows: page, next })
    }
}
