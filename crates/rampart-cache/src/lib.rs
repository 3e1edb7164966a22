//! Sharded cache cluster for horizontal scaling.
//!
//! ## Architecture
//!
//! - **Nodes**: independent key/value stores (Redis in production, an
//!   in-memory map for local mode), each holding a shard of the entries
//! - **Routing**: `sha256(key) mod active_nodes`, recomputed on every access
//! - **Failure handling**: an unreachable node is dropped from the active set
//!   for the life of the process
//!
//! ```text
//! put/get → sha256(key) mod N → node[i]
//!                                  ↓ connection failure
//!                          remove node[i], N = N - 1
//! ```
//!
//! ## Graceful Degradation
//!
//! The cache is advisory. Every failure surfaces as a dropped write or a
//! miss, never as an error, so callers always fall back to the source of
//! truth. When the last node disappears the cluster turns into a no-op.

pub mod cluster;
pub mod config;
pub mod error;
pub mod hashing;
pub mod memory;
pub mod node;
pub mod redis_node;
pub mod value;

pub use cluster::CacheCluster;
pub use config::{CacheClusterConfig, CacheNodeConfig};
pub use error::{NodeError, NodeResult};
pub use hashing::shard_index;
pub use memory::MemoryNode;
pub use node::{CacheNode, DynCacheNode};
pub use redis_node::RedisNode;
pub use value::CacheValue;

/// Builds a cluster from configuration.
///
/// Nodes whose pool cannot be created are skipped with a warning. With no
/// configured nodes the cluster runs on a single local [`MemoryNode`].
pub fn create_cache_cluster(config: &CacheClusterConfig, service_name: &str) -> CacheCluster {
    if config.nodes.is_empty() {
        tracing::info!("No cache nodes configured, using local cache only");
        let node: DynCacheNode = std::sync::Arc::new(MemoryNode::new("local"));
        return CacheCluster::new(vec![node]).with_service_name(service_name);
    }

    let mut nodes: Vec<DynCacheNode> = Vec::with_capacity(config.nodes.len());
    for node_config in &config.nodes {
        match RedisNode::connect(node_config, config) {
            Ok(node) => nodes.push(std::sync::Arc::new(node)),
            Err(e) => {
                tracing::warn!(
                    node = %node_config.id,
                    error = %e,
                    "Failed to create cache node pool, leaving it out of the cluster"
                );
            }
        }
    }

    tracing::info!(
        configured = config.nodes.len(),
        active = nodes.len(),
        "Cache cluster created"
    );

    CacheCluster::new(nodes).with_service_name(service_name)
}
