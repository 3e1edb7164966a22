//! The sharded cache cluster.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::NodeError;
use crate::hashing::shard_index;
use crate::node::DynCacheNode;
use crate::value::CacheValue;

/// Best-effort, TTL-bounded key/value storage spread across cache nodes.
///
/// ## Routing
///
/// Each access routes `key` to `active[sha256(key) mod active.len()]`. The
/// mapping is recomputed against the current active set every time, so after
/// a node is lost most keys land somewhere else and read as misses until
/// they are written again.
///
/// ## Failure Handling
///
/// | Operation | Node unreachable                              |
/// |-----------|-----------------------------------------------|
/// | `put`     | drop node, retry on the shrunk set            |
/// | `get`     | drop node, report a miss                      |
///
/// Dropped nodes never come back. Nothing here returns an error.
pub struct CacheCluster {
    active: RwLock<Vec<DynCacheNode>>,
    initial_len: usize,
    service_name: String,
}

impl CacheCluster {
    /// Creates a cluster over `nodes`, in shard order.
    pub fn new(nodes: Vec<DynCacheNode>) -> Self {
        Self {
            initial_len: nodes.len(),
            active: RwLock::new(nodes),
            service_name: "rampart".to_string(),
        }
    }

    /// Sets the service name reported when the cluster stops responding.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Stores `value` under `key`.
    ///
    /// `ttl` of `None` stores without expiry; a zero TTL skips the write.
    /// Unreachable nodes are removed and the write retried, at most once per
    /// original node. If no node accepts the write it is dropped.
    pub async fn put(&self, key: &str, value: impl Into<CacheValue>, ttl: Option<Duration>) {
        if ttl.is_some_and(|ttl| ttl.is_zero()) {
            tracing::debug!(key = %key, "zero ttl, not caching");
            return;
        }

        let bytes = value.into().to_bytes();

        for _ in 0..self.initial_len {
            let Some(node) = self.node_for(key) else {
                break;
            };

            match node.write(key, &bytes, ttl).await {
                Ok(()) => {
                    tracing::debug!(key = %key, node = %node.id(), ttl = ?ttl, "cache set");
                    return;
                }
                Err(e @ NodeError::Unreachable { .. }) => {
                    self.remove_node(&node, &e);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "cache SET error, dropping write");
                    return;
                }
            }
        }

        if self.active_len() == 0 {
            self.report_exhausted();
        } else {
            tracing::warn!(key = %key, "cache write dropped after exhausting retries");
        }
    }

    /// Serializes `value` as JSON and stores it.
    ///
    /// Serialization failures drop the write.
    pub async fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_value(value) {
            Ok(json) => self.put(key, json, ttl).await,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to serialize cache value");
            }
        }
    }

    /// Reads `key` from the node that currently owns it.
    ///
    /// Returns `None` on a miss, on an expired entry, when the key was
    /// written under an earlier node set, and on any node failure.
    pub async fn get(&self, key: &str) -> Option<CacheValue> {
        let node = match self.node_for(key) {
            Some(node) => node,
            None => {
                tracing::debug!(key = %key, "cache miss (no active nodes)");
                return None;
            }
        };

        match node.read(key).await {
            Ok(Some(bytes)) => {
                tracing::debug!(key = %key, node = %node.id(), "cache hit");
                Some(CacheValue::from_bytes(bytes))
            }
            Ok(None) => {
                tracing::debug!(key = %key, node = %node.id(), "cache miss");
                None
            }
            Err(e @ NodeError::Unreachable { .. }) => {
                self.remove_node(&node, &e);
                if self.active_len() == 0 {
                    self.report_exhausted();
                }
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache GET error");
                None
            }
        }
    }

    /// Reads `key` and deserializes it from JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.get(key).await? {
            CacheValue::Json(value) => value,
            CacheValue::Text(text) => serde_json::from_str(&text).ok()?,
            CacheValue::Bytes(_) => return None,
        };

        serde_json::from_value(value)
            .map_err(|e| {
                tracing::debug!(key = %key, error = %e, "cached value has unexpected shape");
            })
            .ok()
    }

    /// Number of nodes still in the active set.
    pub fn active_len(&self) -> usize {
        self.active.read().len()
    }

    /// Number of nodes the cluster started with.
    pub fn initial_len(&self) -> usize {
        self.initial_len
    }

    /// Identifiers of the active nodes, in shard order.
    pub fn active_node_ids(&self) -> Vec<String> {
        self.active
            .read()
            .iter()
            .map(|node| node.id().to_string())
            .collect()
    }

    /// Identifier of the node `key` routes to right now.
    pub fn owner_of(&self, key: &str) -> Option<String> {
        self.node_for(key).map(|node| node.id().to_string())
    }

    fn node_for(&self, key: &str) -> Option<DynCacheNode> {
        let active = self.active.read();
        shard_index(key, active.len()).map(|index| Arc::clone(&active[index]))
    }

    /// Drops `failed` from the active set. Removing an absent node is a no-op.
    ///
    /// Matches the handle, not the id, so nodes sharing an id are removed
    /// one at a time.
    fn remove_node(&self, failed: &DynCacheNode, cause: &NodeError) {
        let mut active = self.active.write();
        let before = active.len();
        active.retain(|node| !std::ptr::addr_eq(Arc::as_ptr(node), Arc::as_ptr(failed)));

        if active.len() < before {
            tracing::warn!(
                node = %failed.id(),
                remaining = active.len(),
                error = %cause,
                "Cache node removed from cluster"
            );
        }
    }

    fn report_exhausted(&self) {
        let host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());

        tracing::error!(
            severity = "critical",
            service = %format!("{}_{}", self.service_name, host),
            "Cache cluster is not responding"
        );
    }
}
