use redis::aio::MultiplexedConnection;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::{Cmd, FromRedisValue, Pipeline};
use anyhow::Result;

#[derive(Clone)]
enum RedisConnection {
    Single(MultiplexedConnection),
    Cluster(ClusterConnection),
}

/// Thin wrapper that hides whether we talk to one Redis node or a cluster.
/// Connections are multiplexed, so clones share the underlying socket(s).
#[derive(Clone)]
pub struct RedisClient {
    conn: RedisConnection,
}

impl RedisClient {
    /// `urls` is a comma separated list; more than one entry means Redis
    /// Cluster.
    pub async fn connect(urls: &str) -> Result<Self> {
        let redis_urls = urls
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>();
        let conn = match redis_urls.len() {
            0 => return Err(anyhow::anyhow!("no Redis URL configured")),
            1 => {
                log::debug!("Using single Redis instance at: {}", redis_urls[0]);
                let client = redis::Client::open(redis_urls[0].clone())?;
                RedisConnection::Single(client.get_multiplexed_async_connection().await?)
            }
            _ => {
                log::debug!("Using Redis Cluster with URLs: {:?}", redis_urls);
                let client = ClusterClient::new(redis_urls)?;
                RedisConnection::Cluster(client.get_async_connection().await?)
            }
        };
        Ok(Self { conn })
    }

    pub async fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T> {
        let value = match &self.conn {
            RedisConnection::Single(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await?
            }
            RedisConnection::Cluster(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await?
            }
        };
        Ok(value)
    }

    pub async fn query_pipeline<T: FromRedisValue>(&self, pipe: &Pipeline) -> Result<T> {
        let value = match &self.conn {
            RedisConnection::Single(conn) => {
                let mut conn = conn.clone();
                pipe.query_async(&mut conn).await?
            }
            RedisConnection::Cluster(conn) => {
                let mut conn = conn.clone();
                pipe.query_async(&mut conn).await?
            }
        };
        Ok(value)
    }
}
