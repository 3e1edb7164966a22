pub mod config;
pub mod monitor;
pub mod observability;

use std::sync::Arc;
use std::time::Duration;

use rampart_auth::{TokenTtl, ttl_from_credential};
use rampart_cache::{CacheCluster, CacheValue, create_cache_cluster};
use rampart_db::{DynQueryRouter, PgHealthProbe, QueryRouter, RouterError};

pub use config::{AppConfig, ConfigError, LoggingConfig, ServiceConfig};
pub use monitor::{TopologyReport, run_topology_monitor};
pub use observability::{apply_logging_level, init_tracing};

/// The router and the cache cluster, built once per process and shared by
/// every request handler.
///
/// The two halves are independent: a database outage does not touch the
/// cache and the other way round.
#[derive(Clone)]
pub struct DataAccessLayer {
    pub router: DynQueryRouter,
    pub cache: Arc<CacheCluster>,
    postgres: Option<Arc<PgHealthProbe>>,
}

impl DataAccessLayer {
    /// Builds the layer from configuration.
    ///
    /// Database pools are lazy and cache nodes connect on first use, so
    /// nodes that are down at start-up are discovered by the first request
    /// that reaches them.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, RouterError> {
        let probe = Arc::new(PgHealthProbe::from_config(&cfg.router)?);
        let router = QueryRouter::from_config(&cfg.router, probe.clone())?;
        let cache = create_cache_cluster(&cfg.cache, &cfg.service.name);

        Ok(Self {
            router: Arc::new(router),
            cache: Arc::new(cache),
            postgres: Some(probe),
        })
    }

    /// Assembles a layer from already-built parts, with no connection pools.
    pub fn new(router: DynQueryRouter, cache: Arc<CacheCluster>) -> Self {
        Self {
            router,
            cache,
            postgres: None,
        }
    }

    /// The PostgreSQL probe that owns the per-endpoint pools, when the layer
    /// was built from configuration.
    pub fn postgres(&self) -> Option<&Arc<PgHealthProbe>> {
        self.postgres.as_ref()
    }

    /// Caches a value derived from a bearer credential for no longer than
    /// the credential itself lives.
    ///
    /// Returns the TTL that was applied; nothing is written when the
    /// credential is expired, unreadable, or carries no expiry.
    pub async fn cache_for_credential(
        &self,
        key: &str,
        value: impl Into<CacheValue>,
        token: &str,
    ) -> TokenTtl {
        let ttl = ttl_from_credential(token);
        match ttl.cache_ttl() {
            Some(duration) => self.cache.put(key, value, Some(duration)).await,
            None => tracing::debug!(key = %key, ttl = ?ttl, "credential not cacheable"),
        }
        ttl
    }

    /// Write endpoint bounded by `deadline`, for request-serving paths.
    pub async fn write_endpoint_within(
        &self,
        deadline: Duration,
    ) -> Result<rampart_db::Endpoint, RouterError> {
        self.router.route_write_within(deadline).await
    }
}
