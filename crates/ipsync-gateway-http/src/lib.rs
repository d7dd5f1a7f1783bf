// # HTTP Status Gateway
//
// This crate provides the reqwest-backed gateway between the IPSync
// controller and the remote status service.
//
// ## API Reference
//
// - Fetch status: GET  `<endpoint>api/status` → JSON object keyed by domain
// - Sync all:     POST `<endpoint>sync_all`   → empty body, status only
//
// ## Error Mapping
//
// - Endpoint that is not an absolute http(s) URL with a host → `Error::InvalidEndpoint`
// - Response with a non-2xx status                        → `Error::Rejected`
// - No response, unreadable or undecodable body            → `Error::Transport`
//
// The gateway is single-shot: no retries, no caching, no background tasks.
// The only timeout is the client's request timeout.

use async_trait::async_trait;
use ipsync_core::traits::{GatewayFactory, StatusGateway};
use ipsync_core::{Error, Result, StatusMap};
use reqwest::Url;
use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

/// Default request timeout (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the status document, relative to the endpoint
const STATUS_PATH: &str = "api/status";

/// Path of the sync trigger, relative to the endpoint
const SYNC_PATH: &str = "sync_all";

/// Gateway bound to one endpoint
#[derive(Debug, Clone)]
pub struct HttpStatusGateway {
    endpoint: String,
    status_url: Url,
    sync_url: Url,
    client: reqwest::Client,
}

impl HttpStatusGateway {
    /// Bind a gateway to `endpoint` using `client`
    ///
    /// Does not touch the network. Fails with `Error::InvalidEndpoint` when
    /// the endpoint is not an absolute `http`/`https` URL with a host.
    pub fn new(endpoint: &str, client: reqwest::Client) -> Result<Self> {
        let base = Url::parse(endpoint)
            .map_err(|e| Error::invalid_endpoint(format!("'{}': {}", endpoint, e)))?;

        match base.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::invalid_endpoint(format!(
                    "'{}': unsupported scheme '{}'",
                    endpoint, other
                )));
            }
        }

        if base.host_str().is_none_or(str::is_empty) {
            return Err(Error::invalid_endpoint(format!("'{}': missing host", endpoint)));
        }

        let join = |path: &str| {
            base.join(path)
                .map_err(|e| Error::invalid_endpoint(format!("'{}': {}", endpoint, e)))
        };

        Ok(Self {
            endpoint: endpoint.to_string(),
            status_url: join(STATUS_PATH)?,
            sync_url: join(SYNC_PATH)?,
            client,
        })
    }

    /// Resolved status URL
    pub fn status_url(&self) -> &Url {
        &self.status_url
    }

    /// Resolved sync URL
    pub fn sync_url(&self) -> &Url {
        &self.sync_url
    }
}

#[async_trait]
impl StatusGateway for HttpStatusGateway {
    async fn fetch_status(&self) -> Result<StatusMap> {
        tracing::debug!("GET {}", self.status_url);

        let response = self
            .client
            .get(self.status_url.clone())
            .send()
            .await
            .map_err(|e| Error::transport(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::rejected(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("failed to read response: {}", describe(&e))))?;

        parse_status_body(&body)
    }

    async fn trigger_sync(&self) -> Result<()> {
        tracing::debug!("POST {}", self.sync_url);

        let response = self
            .client
            .post(self.sync_url.clone())
            .send()
            .await
            .map_err(|e| Error::transport(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::rejected(status.as_u16()));
        }

        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Decode a status body; an absent body (empty or `null`) is an empty map
pub fn parse_status_body(body: &[u8]) -> Result<StatusMap> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StatusMap::new());
    }

    serde_json::from_slice::<Option<StatusMap>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| Error::transport(format!("invalid status response: {}", e)))
}

/// Full cause chain of a transport error
///
/// reqwest's own message omits the root cause (e.g. "Connection refused").
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Settings for the shared HTTP client
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
            user_agent: concat!("ipsync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Factory for HTTP gateways; all gateways share one client
#[derive(Debug, Clone)]
pub struct HttpGatewayFactory {
    client: reqwest::Client,
}

impl HttpGatewayFactory {
    /// Build the shared client
    pub fn new(config: HttpGatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl GatewayFactory for HttpGatewayFactory {
    fn create(&self, endpoint: &str) -> Result<Arc<dyn StatusGateway>> {
        Ok(Arc::new(HttpStatusGateway::new(endpoint, self.client.clone())?))
    }
}
