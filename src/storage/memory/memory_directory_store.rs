use crate::traits::directory_store::DirectoryStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    attributes: Mutex<HashMap<(String, String), Vec<String>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// Process-local directory. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryDirectoryStore {
    inner: Arc<Inner>,
}

impl MemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("memory directory store: {} unavailable", what));
        }
        Ok(())
    }

    fn key(entry: &str, attribute: &str) -> (String, String) {
        (entry.to_string(), attribute.to_string())
    }
}

impl DirectoryStore for MemoryDirectoryStore {
    async fn read_values(&self, entry: &str, attribute: &str) -> Result<Vec<String>> {
        self.check(&self.inner.fail_reads, "reads")?;
        let attributes = self.inner.attributes.lock().await;
        Ok(attributes.get(&Self::key(entry, attribute)).cloned().unwrap_or_default())
    }

    async fn add_value(&self, entry: &str, attribute: &str, value: &str) -> Result<()> {
        self.check(&self.inner.fail_writes, "writes")?;
        let mut attributes = self.inner.attributes.lock().await;
        let values = attributes.entry(Self::key(entry, attribute)).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
        Ok(())
    }

    async fn replace_value(&self, entry: &str, attribute: &str, old: &str, new: &str) -> Result<()> {
        self.check(&self.inner.fail_writes, "writes")?;
        let mut attributes = self.inner.attributes.lock().await;
        let values = attributes.entry(Self::key(entry, attribute)).or_default();
        values.retain(|v| v != old && v != new);
        values.push(new.to_string());
        Ok(())
    }

    async fn delete_value(&self, entry: &str, attribute: &str, value: &str) -> Result<bool> {
        self.check(&self.inner.fail_writes, "writes")?;
        let mut attributes = self.inner.attributes.lock().await;
        let Some(values) = attributes.get_mut(&Self::key(entry, attribute)) else {
            return Ok(false);
        };
        let before = values.len();
        values.retain(|v| v != value);
        Ok(values.len() != before)
    }
}
