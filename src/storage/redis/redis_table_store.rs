use crate::storage::redis::redis_client::RedisClient;
use crate::traits::table_store::{TablePage, TableCursor, TableStore};
use anyhow::Result;

const SCAN_PAGE_SIZE: usize = 100;

/// One Redis hash per table; rows are hash fields.
pub struct RedisTableStore {
    client: RedisClient,
    namespace: String,
}

impl RedisTableStore {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            namespace: "table".to_string(),
        }
    }

    fn table_key(&self, table: &str) -> String {
        format!("{}:{}", self.namespace, table)
    }
}

impl TableStore for RedisTableStore {
    async fn put(&self, table: &str, key: &str, value: &str) -> Result<()> {
        let _: i64 = self
            .client
            .query(redis::cmd("HSET").arg(self.table_key(table)).arg(key).arg(value))
            .await?;
        log::debug!("HSET {} {}", self.table_key(table), key);
        Ok(())
    }

    async fn remove(&self, table: &str, key: &str) -> Result<bool> {
        let removed: i64 = self
            .client
            .query(redis::cmd("HDEL").arg(self.table_key(table)).arg(key))
            .await?;
        Ok(removed > 0)
    }

    async fn scan(&self, table: &str, cursor: TableCursor) -> Result<TablePage> {
        let position = match cursor {
            TableCursor::Start => "0".to_string(),
            TableCursor::Next(position) => position,
        };
        let (next, flat): (String, Vec<String>) = self
            .client
            .query(
                redis::cmd("HSCAN")
                    .arg(self.table_key(table))
                    .arg(&position)
                    .arg("COUNT")
                    .arg(SCAN_PAGE_SIZE),
            )
            .await?;
        if flat.len() % 2 != 0 {
            return Err(anyhow::anyhow!("HSCAN returned an odd number of elements"));
        }
        let rows = flat
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect::<Vec<_>>();
        let next = if next == "0" { None } else { Some(TableCursor::Next(next)) };
        Ok(TablePage { rows, next })
    }
}
