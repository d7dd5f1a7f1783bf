//! Status sync controller
//!
//! The StatusSyncController is responsible for:
//! - Deriving a gateway from the persisted endpoint
//! - Fetching and caching per-domain status
//! - Triggering a bulk re-sync and refreshing afterwards
//! - Publishing loading/error state to presentation
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────┐  commands   ┌──────────────────────┐  calls  ┌───────────────┐
//!  │ presentation │───────────▶│ StatusSyncController │───────▶│ StatusGateway │
//!  └──────────────┘             └──────────────────────┘         └───────────────┘
//!         ▲                          │            │
//!         │   watch::Receiver        │            ▼
//!         └──── ControllerState ◀────┘      ┌─────────────┐
//!                                           │ ConfigStore │
//!                                           └─────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Commands return immediately; the network call runs on a spawned task and
//! state is updated when it completes. Nothing serializes separate commands:
//! overlapping calls run to completion independently and the last one to
//! finish decides `status_map`, `error` and `is_loading`. There is no
//! cancellation, no retry and no timeout at this layer.

mod messages;

use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::{ControllerState, StatusMap};
use crate::normalize::normalize_endpoint;
use crate::traits::{ConfigStore, GatewayFactory, StatusGateway};

/// Single source of truth for [`ControllerState`]
///
/// Cheap to clone; clones share state and gateway binding.
///
/// ## Lifecycle
///
/// 1. Create with [`StatusSyncController::new()`] (inside a tokio runtime)
/// 2. Observe with [`subscribe()`](Self::subscribe) or [`changes()`](Self::changes)
/// 3. Drive with [`set_endpoint()`](Self::set_endpoint),
///    [`refresh_status()`](Self::refresh_status) and
///    [`trigger_sync()`](Self::trigger_sync)
#[derive(Clone)]
pub struct StatusSyncController {
    inner: Arc<Inner>,
}

struct Inner {
    /// Persisted endpoint
    store: Arc<dyn ConfigStore>,

    /// Builds a gateway whenever the endpoint changes
    factory: Arc<dyn GatewayFactory>,

    /// `None` until a valid endpoint is bound
    gateway: RwLock<Option<Arc<dyn StatusGateway>>>,

    /// Observable state
    state: watch::Sender<ControllerState>,
}

impl StatusSyncController {
    /// Create a controller from persisted configuration
    ///
    /// When an endpoint was persisted, a gateway is bound to it and an initial
    /// refresh is started in the background; this call does not wait for it.
    pub async fn new(store: Arc<dyn ConfigStore>, factory: Arc<dyn GatewayFactory>) -> Self {
        let endpoint = store.load().await;
        let (state, _) = watch::channel(ControllerState {
            endpoint: endpoint.clone(),
            ..Default::default()
        });

        let controller = Self {
            inner: Arc::new(Inner {
                store,
                factory,
                gateway: RwLock::new(None),
                state,
            }),
        };

        if endpoint.is_empty() {
            debug!("No endpoint configured, waiting for setup");
        } else {
            info!("Using persisted endpoint {}", endpoint);
            controller.inner.bind(&endpoint);
            let _ = controller.refresh_status();
        }

        controller
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ControllerState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.inner.state.subscribe()
    }

    /// State changes as a stream, starting with the current state
    pub fn changes(&self) -> WatchStream<ControllerState> {
        WatchStream::new(self.subscribe())
    }

    /// Current normalized endpoint, empty when unconfigured
    pub fn endpoint(&self) -> String {
        self.inner.state.borrow().endpoint.clone()
    }

    /// Whether commands currently have a gateway to act on
    pub fn is_bound(&self) -> bool {
        self.inner.current_gateway().is_some()
    }

    /// Normalize, persist and apply a user-entered endpoint
    ///
    /// Blank input is ignored entirely: nothing is persisted and state does
    /// not change. Otherwise the endpoint is durable before the gateway is
    /// rebound, and a refresh is started.
    ///
    /// # Returns
    ///
    /// Handle of the started refresh, or `None` when no refresh was started
    /// (blank input, or the endpoint could not be bound).
    pub async fn set_endpoint(&self, raw_input: &str) -> Option<JoinHandle<()>> {
        let endpoint = normalize_endpoint(raw_input);
        if endpoint.is_empty() {
            debug!("Ignoring blank endpoint input");
            return None;
        }

        if let Err(e) = self.inner.store.save(&endpoint).await {
            warn!("Failed to persist endpoint {}: {}", endpoint, e);
        }

        info!("Endpoint set to {}", endpoint);
        self.inner
            .state
            .send_modify(|state| state.endpoint = endpoint.clone());
        self.inner.bind(&endpoint);

        self.refresh_status()
    }

    /// Forget the endpoint and return to the unconfigured state
    ///
    /// Persists the empty value, unbinds the gateway and resets the cache so
    /// presentation routes back to setup. Requests already in flight still
    /// complete and may write their outcome afterwards.
    pub async fn clear_endpoint(&self) {
        let persisted = self.inner.store.save("").await;

        *self
            .inner
            .gateway
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;

        info!("Endpoint cleared");
        self.inner.state.send_modify(|state| {
            *state = ControllerState {
                error: persisted.err().map(|e| messages::storage(&e)),
                ..Default::default()
            };
        });
    }

    /// Fetch status and replace the cache
    ///
    /// Silent no-op without a bound gateway.
    ///
    /// # Returns
    ///
    /// Handle of the spawned fetch, `None` when nothing was started.
    pub fn refresh_status(&self) -> Option<JoinHandle<()>> {
        let gateway = self.inner.current_gateway()?;
        let inner = Arc::clone(&self.inner);

        inner.begin_refresh();
        Some(tokio::spawn(async move {
            let result = gateway.fetch_status().await;
            inner.finish_refresh(result);
        }))
    }

    /// Ask the service to re-sync every domain, then refresh
    ///
    /// Silent no-op without a bound gateway. On success the refresh runs on
    /// the same task and owns the final `is_loading = false`.
    ///
    /// # Returns
    ///
    /// Handle of the spawned sync (and follow-up refresh), `None` when
    /// nothing was started.
    pub fn trigger_sync(&self) -> Option<JoinHandle<()>> {
        let gateway = self.inner.current_gateway()?;
        let inner = Arc::clone(&self.inner);

        inner.state.send_modify(|state| state.is_loading = true);
        Some(tokio::spawn(async move {
            match gateway.trigger_sync().await {
                Ok(()) => {
                    info!("Sync triggered on {}", gateway.endpoint());
                    inner.begin_refresh();
                    let result = gateway.fetch_status().await;
                    inner.finish_refresh(result);
                }
                Err(e) => {
                    warn!("Sync failed on {}: {}", gateway.endpoint(), e);
                    inner.state.send_modify(|state| {
                        state.error = Some(messages::sync_failure(&e));
                        state.is_loading = false;
                    });
                }
            }
        }))
    }
}

impl Inner {
    fn current_gateway(&self) -> Option<Arc<dyn StatusGateway>> {
        self.gateway
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Rebuild the gateway for `endpoint`; on failure leave none bound
    fn bind(&self, endpoint: &str) {
        let created = self.factory.create(endpoint);
        let mut slot = self
            .gateway
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match created {
            Ok(gateway) => {
                debug!("Gateway bound to {}", gateway.endpoint());
                *slot = Some(gateway);
            }
            Err(e) => {
                warn!("Cannot bind gateway to {}: {}", endpoint, e);
                *slot = None;
                drop(slot);
                self.state
                    .send_modify(|state| state.error = Some(messages::invalid_endpoint(&e)));
            }
        }
    }

    fn begin_refresh(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
    }

    fn finish_refresh(&self, result: Result<StatusMap>) {
        match result {
            Ok(status_map) => {
                debug!("Fetched status for {} domain(s)", status_map.len());
                self.state.send_modify(|state| {
                    state.status_map = status_map;
                    state.is_loading = false;
                });
            }
            Err(e) => {
                warn!("Status fetch failed: {}", e);
                self.state.send_modify(|state| {
                    state.error = Some(messages::fetch_failure(&e));
                    state.is_loading = false;
                });
            }
        }
    }
}
