// # Status Gateway Trait
//
// Defines the interface over the two calls the client makes to the remote
// service:
//
// - `GET  <endpoint>api/status` → JSON object keyed by domain name
// - `POST <endpoint>sync_all`   → empty body, success by status only
//
// ## Error Contract
//
// Implementations MUST keep the failure modes distinguishable:
//
// - `Error::Rejected { status }` for a response with a non-2xx status
// - `Error::Transport(_)` when no usable response was obtained
//
// Gateways are single-shot: no retries, no caching, no background tasks.
// Timeout policy belongs to the transport used by the implementation.

use async_trait::async_trait;
use std::sync::Arc;

use crate::model::StatusMap;

/// Trait for remote status gateway implementations
#[async_trait]
pub trait StatusGateway: Send + Sync {
    /// Fetch the current per-domain status
    ///
    /// # Returns
    ///
    /// - `Ok(StatusMap)`: Parsed body (empty when the body is absent)
    /// - `Err(Error::Rejected)`: Non-success status
    /// - `Err(Error::Transport)`: No usable response
    async fn fetch_status(&self) -> Result<StatusMap, crate::Error>;

    /// Ask the remote service to re-sync every domain
    ///
    /// # Returns
    ///
    /// - `Ok(())`: 2xx response
    /// - `Err(Error::Rejected)`: Non-success status
    /// - `Err(Error::Transport)`: No usable response
    async fn trigger_sync(&self) -> Result<(), crate::Error>;

    /// The normalized endpoint this gateway is bound to
    fn endpoint(&self) -> &str;
}

/// Builds gateways bound to an endpoint
///
/// Construction must not touch the network; it only validates and prepares.
pub trait GatewayFactory: Send + Sync {
    /// Create a gateway for `endpoint`
    ///
    /// # Returns
    ///
    /// - `Ok(gateway)`: Ready to use
    /// - `Err(Error::InvalidEndpoint)`: The endpoint cannot be used
    fn create(&self, endpoint: &str) -> Result<Arc<dyn StatusGateway>, crate::Error>;
}
