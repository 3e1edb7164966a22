//! Integration tests against real Redis nodes.
//!
//! Tests use testcontainers to spin up Redis instances.
//!
//! Run with: cargo test -p rampart-cache --test redis_cluster -- --ignored

use std::time::Duration;

use rampart_cache::{
    CacheClusterConfig, CacheNode, CacheNodeConfig, CacheValue, RedisNode, create_cache_cluster,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::redis::Redis;

async fn start_redis() -> (ContainerAsync<Redis>, String) {
    let container = Redis::default()
        .start()
        .await
        .expect("start redis container");
    let host_port = container.get_host_port_ipv4(6379).await.expect("get port");
    (container, format!("redis://127.0.0.1:{host_port}"))
}

fn cluster_config(urls: &[String]) -> CacheClusterConfig {
    CacheClusterConfig {
        nodes: urls
            .iter()
            .enumerate()
            .map(|(i, url)| CacheNodeConfig::new(format!("cache-{i}"), url.clone()))
            .collect(),
        pool_size: 4,
        timeout_ms: 500,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_redis_node_round_trip_with_ttl() {
    let (_container, url) = start_redis().await;
    let config = cluster_config(std::slice::from_ref(&url));
    let node = RedisNode::connect(&config.nodes[0], &config).expect("pool");

    node.write("k", b"v", Some(Duration::from_millis(300)))
        .await
        .expect("write");
    assert_eq!(node.read("k").await.expect("read"), Some(b"v".to_vec()));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(node.read("k").await.expect("read"), None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_cluster_survives_losing_a_node() {
    let (first, url_a) = start_redis().await;
    let (_second, url_b) = start_redis().await;
    let (_third, url_c) = start_redis().await;

    let cluster = create_cache_cluster(&cluster_config(&[url_a, url_b, url_c]), "lobby");
    assert_eq!(cluster.active_len(), 3);

    cluster.put("k", "v1", Some(Duration::from_secs(30))).await;
    assert_eq!(cluster.get("k").await, Some(CacheValue::Text("v1".into())));

    first.stop().await.expect("stop container");

    // Touch keys until one lands on the stopped node
    for i in 0..64 {
        if cluster.active_len() < 3 {
            break;
        }
        cluster.get(&format!("key-{i}")).await;
    }

    cluster.put("k", "v2", Some(Duration::from_secs(30))).await;
    assert_eq!(cluster.active_node_ids(), vec!["cache-1", "cache-2"]);
    assert_eq!(cluster.get("k").await, Some(CacheValue::Text("v2".into())));
}

#[tokio::test]
async fn test_local_mode_without_nodes() {
    let cluster = create_cache_cluster(&CacheClusterConfig::default(), "auth");
    assert_eq!(cluster.active_node_ids(), vec!["local"]);

    cluster.put("token:abc", "valid", Some(Duration::from_secs(60))).await;
    assert_eq!(
        cluster.get("token:abc").await,
        Some(CacheValue::Text("valid".into()))
    );
}
