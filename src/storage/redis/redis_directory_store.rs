use crate::storage::redis::redis_client::RedisClient;
use crate::traits::directory_store::DirectoryStore;
use anyhow::Result;

/// Each `(entry, attribute)` pair maps to a Redis set holding its values.
pub struct RedisDirectoryStore {
    client: RedisClient,
}

impl RedisDirectoryStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn attribute_key(entry: &str, attribute: &str) -> String {
        format!("directory:{}:{}", entry, attribute)
    }
}

impl DirectoryStore for RedisDirectoryStore {
    async fn read_values(&self, entry: &str, attribute: &str) -> Result<Vec<String>> {
        let values: Vec<String> = self
            .client
            .query(redis::cmd("SMEMBERS").arg(Self::attribute_key(entry, attribute)))
            .await?;
        Ok(values)
    }

    async fn add_value(&self, entry: &str, attribute: &str, value: &str) -> Result<()> {
        let _: i64 = self
            .client
            .query(redis::cmd("SADD").arg(Self::attribute_key(entry, attribute)).arg(value))
            .await?;
        Ok(())
    }

    async fn replace_value(&self, entry: &str, attribute: &str, old: &str, new: &str) -> Result<()> {
        let key = Self::attribute_key(entry, attribute);
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SREM").arg(&key).arg(old).ignore()
            .cmd("SADD").arg(&key).arg(new).ignore();
        let _: () = self.client.query_pipeline(&pipe).await?;
        Ok(())
    }

    async fn delete_value(&self, entry: &str, attribute: &str, value: &str) -> Result<bool> {
        let removed: i64 = self
            .client
            .query(redis::cmd("SREM").arg(Self::attribute_key(entry, attribute)).arg(value))
            .await?;
        Ok(removed > 0)
    }
}
