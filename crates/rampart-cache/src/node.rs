//! The node transport boundary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::NodeResult;

/// A single cache node holding one shard of the entries.
///
/// Implementations must be thread-safe and must bound every call by their
/// own connection timeout. A connection-level failure is reported as
/// [`crate::NodeError::Unreachable`]; the cluster reacts by dropping the node.
#[async_trait]
pub trait CacheNode: Send + Sync {
    /// Stable identifier, unique within a cluster.
    fn id(&self) -> &str;

    /// Stores `value` under `key`. `ttl` of `None` stores without expiry.
    async fn write(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> NodeResult<()>;

    /// Reads `key`, returning `None` when absent or expired.
    async fn read(&self, key: &str) -> NodeResult<Option<Vec<u8>>>;
}

/// Type alias for a shareable cache node handle.
pub type DynCacheNode = Arc<dyn CacheNode>;
