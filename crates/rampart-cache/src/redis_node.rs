//! Redis-backed cache node.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, PoolError, Runtime};
use redis::{AsyncCommands, RedisError};
use tracing::{debug, instrument};

use crate::config::{CacheClusterConfig, CacheNodeConfig};
use crate::error::{NodeError, NodeResult};
use crate::node::CacheNode;

/// One Redis instance with its own connection pool.
///
/// Pool waits, connection set-up and every command are bounded by the
/// node timeout, so a dead node costs at most one timeout per call.
pub struct RedisNode {
    id: String,
    pool: Pool,
    timeout: Duration,
}

impl RedisNode {
    /// Creates the node's pool. No connection is opened until first use.
    #[instrument(skip(node, cluster), fields(node = %node.id))]
    pub fn connect(node: &CacheNodeConfig, cluster: &CacheClusterConfig) -> NodeResult<Self> {
        let timeout = Duration::from_millis(cluster.timeout_ms);

        let mut redis_config = Config::from_url(&node.url);
        let pool_config = redis_config.pool.get_or_insert_with(Default::default);
        pool_config.max_size = cluster.pool_size;
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| NodeError::config(&node.id, e.to_string()))?;

        debug!(pool_size = cluster.pool_size, "Redis node pool created");

        Ok(Self::from_pool(node.id.clone(), pool, timeout))
    }

    /// Wraps an existing pool.
    pub fn from_pool(id: impl Into<String>, pool: Pool, timeout: Duration) -> Self {
        Self {
            id: id.into(),
            pool,
            timeout,
        }
    }

    async fn connection(&self) -> NodeResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(|e| self.pool_error(e))
    }

    fn pool_error(&self, err: PoolError) -> NodeError {
        match err {
            PoolError::Backend(e) => self.redis_error(e),
            other => NodeError::unreachable(&self.id, other.to_string()),
        }
    }

    fn redis_error(&self, err: RedisError) -> NodeError {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            NodeError::unreachable(&self.id, err.to_string())
        } else {
            NodeError::command(&self.id, err.to_string())
        }
    }

    fn timed_out(&self) -> NodeError {
        NodeError::unreachable(
            &self.id,
            format!("no response within {}ms", self.timeout.as_millis()),
        )
    }
}

#[async_trait]
impl CacheNode for RedisNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn write(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> NodeResult<()> {
        let op = async {
            let mut conn = self.connection().await?;
            let result = match ttl {
                Some(ttl) => {
                    let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
                    conn.pset_ex::<_, _, ()>(key, value, millis).await
                }
                None => conn.set::<_, _, ()>(key, value).await,
            };
            result.map_err(|e| self.redis_error(e))
        };

        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| self.timed_out())?
    }

    async fn read(&self, key: &str) -> NodeResult<Option<Vec<u8>>> {
        let op = async {
            let mut conn = self.connection().await?;
            conn.get::<_, Option<Vec<u8>>>(key)
                .await
                .map_err(|e| self.redis_error(e))
        };

        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| self.timed_out())?
    }
}
