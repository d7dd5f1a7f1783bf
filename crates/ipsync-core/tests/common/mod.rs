//! Test doubles and common utilities for controller contract tests
//!
//! The doubles script gateway outcomes and count calls so tests can check
//! what the controller did without any network.

#![allow(dead_code)]

use ipsync_core::error::{Error, Result};
use ipsync_core::model::{DomainStatus, StatusClass, StatusMap};
use ipsync_core::store::MemoryConfigStore;
use ipsync_core::traits::{ConfigStore, GatewayFactory, StatusGateway};
use ipsync_core::{ControllerState, StatusSyncController};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// Scripted result of one gateway call
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Ok(T),
    Status(u16),
    Transport(&'static str),
}

impl<T> Outcome<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Outcome::Ok(value) => Ok(value),
            Outcome::Status(code) => Err(Error::rejected(code)),
            Outcome::Transport(msg) => Err(Error::transport(msg)),
        }
    }
}

#[derive(Default)]
struct ScriptInner {
    fetch: Mutex<VecDeque<Outcome<StatusMap>>>,
    sync: Mutex<VecDeque<Outcome<()>>>,
    fetch_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    fetch_calls: AtomicUsize,
    sync_calls: AtomicUsize,
    /// Order in which calls reached the gateway ("fetch" / "sync")
    journal: Mutex<Vec<&'static str>>,
    /// Endpoints passed to the factory
    created: Mutex<Vec<String>>,
}

/// Shared script driving every gateway built by a [`ScriptedFactory`]
///
/// Unscripted calls succeed (fetch with an empty map).
#[derive(Clone, Default)]
pub struct Script {
    inner: Arc<ScriptInner>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_fetch(&self, outcome: Outcome<StatusMap>) -> &Self {
        self.inner.fetch.lock().unwrap().push_back(outcome);
        self
    }

    pub fn push_sync(&self, outcome: Outcome<()>) -> &Self {
        self.inner.sync.lock().unwrap().push_back(outcome);
        self
    }

    /// Hold the next fetch until the returned sender fires (or is dropped)
    pub fn gate_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.inner.fetch_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn fetch_calls(&self) -> usize {
        self.inner.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn sync_calls(&self) -> usize {
        self.inner.sync_calls.load(Ordering::SeqCst)
    }

    pub fn journal(&self) -> Vec<&'static str> {
        self.inner.journal.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<String> {
        self.inner.created.lock().unwrap().clone()
    }

    /// Wait until the gateway has seen `n` fetch calls
    pub async fn wait_for_fetch_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.fetch_calls() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("fetch calls reached in time");
    }
}

/// Gateway whose replies come from a [`Script`]
pub struct ScriptedGateway {
    endpoint: String,
    script: Script,
}

#[async_trait::async_trait]
impl StatusGateway for ScriptedGateway {
    async fn fetch_status(&self) -> Result<StatusMap> {
        let inner = &self.script.inner;
        inner.fetch_calls.fetch_add(1, Ordering::SeqCst);
        inner.journal.lock().unwrap().push("fetch");

        let outcome = inner
            .fetch
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Outcome::Ok(StatusMap::new()));
        let gate = inner.fetch_gates.lock().unwrap().pop_front();

        if let Some(gate) = gate {
            let _ = gate.await;
        }
        outcome.into_result()
    }

    async fn trigger_sync(&self) -> Result<()> {
        let inner = &self.script.inner;
        inner.sync_calls.fetch_add(1, Ordering::SeqCst);
        inner.journal.lock().unwrap().push("sync");

        let outcome = inner.sync.lock().unwrap().pop_front().unwrap_or(Outcome::Ok(()));
        outcome.into_result()
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Factory building [`ScriptedGateway`]s; rejects endpoints containing whitespace
pub struct ScriptedFactory {
    script: Script,
}

impl ScriptedFactory {
    pub fn new(script: Script) -> Self {
        Self { script }
    }
}

impl GatewayFactory for ScriptedFactory {
    fn create(&self, endpoint: &str) -> Result<Arc<dyn StatusGateway>> {
        self.script
            .inner
            .created
            .lock()
            .unwrap()
            .push(endpoint.to_string());

        if endpoint.chars().any(char::is_whitespace) {
            return Err(Error::invalid_endpoint(format!(
                "'{}' is not a valid URL",
                endpoint
            )));
        }

        Ok(Arc::new(ScriptedGateway {
            endpoint: endpoint.to_string(),
            script: self.script.clone(),
        }))
    }
}

/// Memory store that counts saves
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: MemoryConfigStore,
    saves: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self {
            inner: MemoryConfigStore::with_value(value),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn value(&self) -> String {
        self.inner.load().await
    }
}

#[async_trait::async_trait]
impl ConfigStore for CountingStore {
    async fn load(&self) -> String {
        self.inner.load().await
    }

    async fn save(&self, value: &str) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(value).await
    }
}

/// Build a controller over a counting store and a scripted factory
pub async fn controller_with(store: &CountingStore, script: &Script) -> StatusSyncController {
    StatusSyncController::new(
        Arc::new(store.clone()),
        Arc::new(ScriptedFactory::new(script.clone())),
    )
    .await
}

/// Wait until no command is in flight
pub async fn settled(controller: &StatusSyncController) -> ControllerState {
    let mut rx = controller.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|state| !state.is_loading))
        .await
        .expect("controller settles in time")
        .expect("controller alive")
        .clone();
    state
}

/// A status map with one record per `(domain, status, class)`
pub fn status_map(entries: &[(&str, &str, StatusClass)]) -> StatusMap {
    entries
        .iter()
        .map(|(domain, status, class)| {
            (
                domain.to_string(),
                DomainStatus {
                    status: Some(status.to_string()),
                    status_class: Some(*class),
                    ..Default::default()
                },
            )
        })
        .collect()
}
