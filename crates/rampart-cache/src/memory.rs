//! In-process cache node backed by DashMap.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::error::NodeResult;
use crate::node::CacheNode;

/// A cached entry with optional expiry.
#[derive(Clone, Debug)]
struct CachedEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CachedEntry {
    fn new(data: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            data,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }
}

/// Single-instance node: a local DashMap, never unreachable.
///
/// Used for local mode and as a test double. Expiry follows the tokio clock,
/// so paused-time tests can advance past a TTL.
pub struct MemoryNode {
    id: String,
    entries: DashMap<String, CachedEntry>,
}

impl MemoryNode {
    /// Creates an empty node.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: DashMap::new(),
        }
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if a live entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }
}

#[async_trait]
impl CacheNode for MemoryNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn write(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> NodeResult<()> {
        self.entries
            .insert(key.to_string(), CachedEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn read(&self, key: &str) -> NodeResult<Option<Vec<u8>>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.data.clone()));
            }
            // Remove expired entry
            drop(entry);
            self.entries.remove(key);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read() {
        let node = MemoryNode::new("local");
        node.write("k", b"v", None).await.unwrap();
        assert_eq!(node.read("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(node.read("other").await.unwrap(), None);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let node = MemoryNode::new("local");
        tokio_test::block_on(async {
            node.write("k", b"v1", None).await.unwrap();
            node.write("k", b"v2", None).await.unwrap();
            assert_eq!(node.read("k").await.unwrap(), Some(b"v2".to_vec()));
        });
        assert_eq!(node.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_follows_tokio_clock() {
        let node = MemoryNode::new("local");
        node.write("k", b"v", Some(Duration::from_secs(5)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(node.contains("k"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(node.read("k").await.unwrap(), None);
        assert!(node.is_empty());
    }
}
