//! Read/write routing with replica removal and write endpoint promotion.

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::{RouterConfig, validate_topology};
use crate::endpoint::Endpoint;
use crate::error::{Result, RouterError};
use crate::probe::DynHealthProbe;

/// Mutable routing topology.
///
/// Invariants, held between critical sections:
/// - `write_endpoint` is never in `replicas`
/// - `read_index < replicas.len()` whenever `replicas` is non-empty
#[derive(Debug, Clone)]
struct RouterState {
    write_endpoint: Endpoint,
    replicas: Vec<Endpoint>,
    read_index: usize,
}

impl RouterState {
    /// Removes the replica under the read cursor and clamps the cursor.
    fn remove_failed_replica(&mut self) -> Option<Endpoint> {
        if self.replicas.is_empty() {
            return None;
        }

        let failed = self.replicas.remove(self.read_index);
        if self.replicas.is_empty() {
            self.read_index = 0;
            warn!("No replicas available for reading");
        } else {
            self.read_index %= self.replicas.len();
        }
        Some(failed)
    }

    /// Replaces the write endpoint with the first replica.
    fn promote_replica(&mut self) -> Option<Endpoint> {
        if self.replicas.is_empty() {
            return None;
        }

        let promoted = self.replicas.remove(0);
        self.write_endpoint = promoted.clone();
        self.read_index = 0;
        Some(promoted)
    }
}

/// A consistent copy of the router topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterSnapshot {
    pub write_endpoint: Endpoint,
    pub replicas: Vec<Endpoint>,
    pub read_index: usize,
}

/// Chooses a datastore endpoint for every read and write.
///
/// ## Routing
///
/// | Call                  | Healthy                | Probe failure                          |
/// |-----------------------|------------------------|----------------------------------------|
/// | `route_read`          | current replica        | drop replica, try next; else writer    |
/// | `route_write`         | write endpoint         | promote first replica, probe again     |
/// | `allow_schema_change` | `endpoint == writer`   | -                                      |
///
/// Each probe and the state change it triggers run under one lock, so two
/// callers seeing the same failure cannot both promote.
///
/// ## Liveness
///
/// With the writer down and no replica left, `route_write` retries forever.
/// Request handlers should call [`QueryRouter::route_write_within`] or wrap
/// the call in their own timeout.
pub struct QueryRouter {
    state: Mutex<RouterState>,
    probe: DynHealthProbe,
    write_retry_backoff: Duration,
}

impl QueryRouter {
    /// Creates a router over the given topology.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidTopology`] if the write endpoint is
    /// unnamed or listed as a replica, or a replica is listed twice.
    pub fn new(
        write_endpoint: impl Into<Endpoint>,
        replicas: Vec<Endpoint>,
        probe: DynHealthProbe,
    ) -> Result<Self> {
        let write_endpoint = write_endpoint.into();
        validate_topology(write_endpoint.as_str(), &replicas)?;

        info!(
            write_endpoint = %write_endpoint,
            replicas = replicas.len(),
            "Query router initialized"
        );

        Ok(Self {
            state: Mutex::new(RouterState {
                write_endpoint,
                replicas,
                read_index: 0,
            }),
            probe,
            write_retry_backoff: Duration::ZERO,
        })
    }

    /// Creates a router from configuration.
    pub fn from_config(config: &RouterConfig, probe: DynHealthProbe) -> Result<Self> {
        let replicas = config
            .replicas
            .iter()
            .map(|name| Endpoint::from(name.as_str()))
            .collect();

        Ok(Self::new(config.write_endpoint.as_str(), replicas, probe)?
            .with_write_retry_backoff(Duration::from_millis(config.write_retry_backoff_ms)))
    }

    /// Sets the pause between write probes when no replica can be promoted.
    #[must_use]
    pub fn with_write_retry_backoff(mut self, backoff: Duration) -> Self {
        self.write_retry_backoff = backoff;
        self
    }

    /// Returns a healthy replica, or the write endpoint when none is left.
    ///
    /// Tries at most as many replicas as the list held on entry. Every
    /// replica that fails its probe is removed for good.
    pub async fn route_read(&self) -> Endpoint {
        let mut state = self.state.lock().await;

        for _ in 0..state.replicas.len() {
            let Some(candidate) = state.replicas.get(state.read_index).cloned() else {
                break;
            };

            match self.probe.probe(&candidate).await {
                Ok(()) => return candidate,
                Err(e) => {
                    error!(replica = %candidate, error = %e, "Error reading from replica");
                    if let Some(removed) = state.remove_failed_replica() {
                        info!(
                            replica = %removed,
                            remaining = state.replicas.len(),
                            "Replica removed from the replica list"
                        );
                    }
                }
            }
        }

        error!(
            severity = "critical",
            write_endpoint = %state.write_endpoint,
            "No replicas are available for reading, falling back to write endpoint"
        );
        state.write_endpoint.clone()
    }

    /// Returns a healthy write endpoint, promoting replicas as needed.
    ///
    /// Never gives up: once no replica is left it keeps probing the last
    /// write endpoint until it answers.
    pub async fn route_write(&self) -> Endpoint {
        loop {
            {
                let mut state = self.state.lock().await;
                let candidate = state.write_endpoint.clone();

                match self.probe.probe(&candidate).await {
                    Ok(()) => {
                        debug!(write_endpoint = %candidate, "Routing write");
                        return candidate;
                    }
                    Err(e) => {
                        error!(write_endpoint = %candidate, error = %e, "Error writing to write endpoint");
                        if let Some(promoted) = state.promote_replica() {
                            info!(
                                failed = %candidate,
                                write_endpoint = %promoted,
                                "Write endpoint failed, promoted replica"
                            );
                            continue;
                        }
                        error!(
                            severity = "critical",
                            write_endpoint = %candidate,
                            "No replicas are available to promote as the new write endpoint"
                        );
                    }
                }
            }

            if self.write_retry_backoff.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.write_retry_backoff).await;
            }
        }
    }

    /// [`QueryRouter::route_write`] bounded by `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DeadlineExceeded`] if no write endpoint answered
    /// in time. Promotions made before the deadline are kept.
    pub async fn route_write_within(&self, deadline: Duration) -> Result<Endpoint> {
        tokio::time::timeout(deadline, self.route_write())
            .await
            .map_err(|_| RouterError::DeadlineExceeded {
                deadline_ms: deadline.as_millis() as u64,
            })
    }

    /// Returns `true` only for the current write endpoint.
    pub async fn allow_schema_change(&self, endpoint: impl AsRef<str>) -> bool {
        self.state.lock().await.write_endpoint == *endpoint.as_ref()
    }

    /// Current write endpoint, without probing.
    pub async fn write_endpoint(&self) -> Endpoint {
        self.state.lock().await.write_endpoint.clone()
    }

    /// Returns a consistent copy of the topology.
    pub async fn snapshot(&self) -> RouterSnapshot {
        let state = self.state.lock().await;
        RouterSnapshot {
            write_endpoint: state.write_endpoint.clone(),
            replicas: state.replicas.clone(),
            read_index: state.read_index,
        }
    }
}
