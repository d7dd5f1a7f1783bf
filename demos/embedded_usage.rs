//! Minimal embedding example for ipsync-core
//!
//! Drives the controller with an in-process gateway and prints every state
//! change, the way a UI would re-render on each notification.

use ipsync_core::{
    ControllerState, DomainStatus, Result, StatusClass, StatusMap, StatusSyncController,
    store::MemoryConfigStore,
    traits::{GatewayFactory, StatusGateway},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_stream::StreamExt;

/// Gateway that reports drift until a sync has been triggered
struct EmbeddedGateway {
    endpoint: String,
    synced: AtomicBool,
}

#[async_trait::async_trait]
impl StatusGateway for EmbeddedGateway {
    async fn fetch_status(&self) -> Result<StatusMap> {
        let in_sync = self.synced.load(Ordering::SeqCst);
        let dns_ip = if in_sync { "203.0.113.7" } else { "198.51.100.1" };

        let mut map = StatusMap::new();
        map.insert(
            "home.example.org".to_string(),
            DomainStatus {
                external_ip: Some("203.0.113.7".to_string()),
                dns_ip: Some(dns_ip.to_string()),
                status: Some(if in_sync { "OK" } else { "Mismatch" }.to_string()),
                status_class: Some(if in_sync {
                    StatusClass::Success
                } else {
                    StatusClass::Warning
                }),
                last_check: Some("just now".to_string()),
            },
        );
        Ok(map)
    }

    async fn trigger_sync(&self) -> Result<()> {
        self.synced.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

struct EmbeddedFactory;

impl GatewayFactory for EmbeddedFactory {
    fn create(&self, endpoint: &str) -> Result<Arc<dyn StatusGateway>> {
        Ok(Arc::new(EmbeddedGateway {
            endpoint: endpoint.to_string(),
            synced: AtomicBool::new(false),
        }))
    }
}

fn render(state: &ControllerState) {
    if !state.is_configured() {
        println!("[setup] no endpoint configured");
        return;
    }

    let loading = if state.is_loading { " (loading)" } else { "" };
    println!("[dashboard] {}{}", state.endpoint, loading);
    for (domain, status) in &state.status_map {
        println!(
            "    {} [{}] {}",
            domain,
            status.severity(),
            status.status.as_deref().unwrap_or("-")
        );
    }
    if let Some(error) = &state.error {
        println!("    error: {}", error);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let controller = StatusSyncController::new(
        Arc::new(MemoryConfigStore::new()),
        Arc::new(EmbeddedFactory),
    )
    .await;

    let mut changes = controller.changes();
    let printer = tokio::spawn(async move {
        while let Some(state) = changes.next().await {
            render(&state);
        }
    });

    if let Some(refresh) = controller.set_endpoint("192.168.1.10:7777").await {
        let _ = refresh.await;
    }
    if let Some(sync) = controller.trigger_sync() {
        let _ = sync.await;
    }

    // Dropping the last controller closes the stream
    drop(controller);
    let _ = printer.await;
}
