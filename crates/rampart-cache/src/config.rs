//! Configuration types for the cache cluster.

use serde::{Deserialize, Serialize};

/// A single Redis cache node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheNodeConfig {
    /// Node identifier used in logs and for removal.
    pub id: String,

    /// Redis connection URL (e.g., "redis://cache-1:6379")
    pub url: String,
}

impl CacheNodeConfig {
    /// Creates a node configuration.
    #[must_use]
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Cache cluster configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheClusterConfig {
    /// Cache nodes in shard order. Empty means local-only mode.
    #[serde(default)]
    pub nodes: Vec<CacheNodeConfig>,

    /// Connection pool size per node
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Per-node connection and command timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_pool_size() -> usize {
    8
}

fn default_timeout_ms() -> u64 {
    1000
}

impl Default for CacheClusterConfig {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            pool_size: default_pool_size(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl CacheClusterConfig {
    /// Checks node ids are present and unique.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("cache.timeout_ms must be > 0".into());
        }
        if self.pool_size == 0 {
            return Err("cache.pool_size must be > 0".into());
        }
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if node.id.is_empty() {
                return Err("cache.nodes[].id must not be empty".into());
            }
            if node.url.is_empty() {
                return Err(format!("cache node '{}' has an empty url", node.id));
            }
            if !seen.insert(node.id.as_str()) {
                return Err(format!("duplicate cache node id '{}'", node.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheClusterConfig::default();
        assert!(config.nodes.is_empty());
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.timeout_ms, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_node_ids_rejected() {
        let config = CacheClusterConfig {
            nodes: vec![
                CacheNodeConfig::new("cache-1", "redis://a:6379"),
                CacheNodeConfig::new("cache-1", "redis://b:6379"),
            ],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: CacheClusterConfig =
            serde_json::from_str(r#"{"nodes":[{"id":"c1","url":"redis://c1:6379"}]}"#)
                .expect("deserialize");
        assert_eq!(config.nodes.len(), 1);
        assert_eq!(config.timeout_ms, 1000);
    }
}
