//! Periodic topology checks.
//!
//! Failures are normally discovered by requests. The monitor drives the same
//! routing calls on a timer so an idle process still notices lost nodes and
//! logs the topology it is running on.

use std::future::Future;
use std::time::Duration;

use rampart_db::{Endpoint, RouterSnapshot};
use serde::Serialize;
use tokio::time::MissedTickBehavior;

use crate::DataAccessLayer;

/// Topology seen by one monitor pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyReport {
    pub write_endpoint: String,
    pub replicas: Vec<String>,
    pub cache_nodes: Vec<String>,
    pub cache_nodes_lost: usize,
}

impl TopologyReport {
    pub fn new(snapshot: &RouterSnapshot, cache_nodes: Vec<String>, initial_cache_nodes: usize) -> Self {
        Self {
            write_endpoint: snapshot.write_endpoint.to_string(),
            replicas: snapshot.replicas.iter().map(Endpoint::to_string).collect(),
            cache_nodes_lost: initial_cache_nodes.saturating_sub(cache_nodes.len()),
            cache_nodes,
        }
    }
}

impl DataAccessLayer {
    /// Routes one read and one write, then reports the resulting topology.
    ///
    /// The write is bounded by `write_deadline`; a total database outage is
    /// logged and the pass carries on.
    pub async fn check_topology(&self, write_deadline: Duration) -> TopologyReport {
        let read = self.router.route_read().await;
        tracing::debug!(endpoint = %read, "read route checked");

        match self.router.route_write_within(write_deadline).await {
            Ok(endpoint) => tracing::debug!(endpoint = %endpoint, "write route checked"),
            Err(e) => tracing::error!(error = %e, "write route check failed"),
        }

        self.topology().await
    }

    /// Current topology, without probing anything.
    pub async fn topology(&self) -> TopologyReport {
        let snapshot = self.router.snapshot().await;
        TopologyReport::new(
            &snapshot,
            self.cache.active_node_ids(),
            self.cache.initial_len(),
        )
    }
}

/// Runs [`DataAccessLayer::check_topology`] every `interval` until
/// `shutdown` resolves.
///
/// Returns the last report taken, if any pass completed.
pub async fn run_topology_monitor<F>(
    layer: DataAccessLayer,
    interval: Duration,
    shutdown: F,
) -> Option<TopologyReport>
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut last: Option<TopologyReport> = None;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Topology monitor stopping");
                return last;
            }
            _ = ticker.tick() => {
                let report = layer.check_topology(interval).await;
                if last.as_ref() != Some(&report) {
                    tracing::info!(
                        write_endpoint = %report.write_endpoint,
                        replicas = ?report.replicas,
                        cache_nodes = ?report.cache_nodes,
                        cache_nodes_lost = report.cache_nodes_lost,
                        "Topology changed"
                    );
                }
                last = Some(report);
            }
        }
    }
}
