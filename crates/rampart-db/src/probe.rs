//! The health probe boundary.

use std::sync::Arc;

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::ProbeError;

/// A lightweight round-trip health check with a short, fixed timeout.
///
/// Implementations must not reconnect aggressively or retry; the router
/// decides what a failure means.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Returns `Ok(())` if `endpoint` answered in time.
    async fn probe(&self, endpoint: &Endpoint) -> Result<(), ProbeError>;
}

/// Type alias for a shareable probe.
pub type DynHealthProbe = Arc<dyn HealthProbe>;
