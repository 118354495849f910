use anyhow::Result;

/// Position of a paged table scan. `Start` begins a new iteration; a backend
/// hands back `Next` until the table is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCursor {
    Start,
    Next(String),
}

#[derive(Debug, Default, Clone)]
pub struct TablePage {
    pub rows: Vec<(String, String)>,
    pub next: Option<TableCursor>,
}

/// Row-oriented key/value table, one value per key. Writes to a single key
/// are atomic.
#[trait_variant::make(TableStore: Send)]
pub trait UnsendTableStore {
    async fn put(&self, table: &str, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, table: &str, key: &str) -> Result<bool>;
    async fn scan(&self, table: &str, cursor: TableCursor) -> Result<TablePage>;
}
