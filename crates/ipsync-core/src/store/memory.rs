// # Memory Config Store
//
// In-memory implementation of ConfigStore.
//
// Nothing survives a restart. Useful for tests and for embedding the
// controller where the host application persists configuration itself.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::ConfigStore;

/// In-memory config store
///
/// Clones share the same value.
///
/// # Example
///
/// ```rust
/// use ipsync_core::store::MemoryConfigStore;
/// use ipsync_core::traits::ConfigStore;
///
/// # tokio_test::block_on(async {
/// let store = MemoryConfigStore::new();
/// assert_eq!(store.load().await, "");
///
/// store.save("http://host/").await.unwrap();
/// assert_eq!(store.load().await, "http://host/");
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    inner: Arc<RwLock<String>>,
}

impl MemoryConfigStore {
    /// Create an unconfigured store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `value`
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value.into())),
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> String {
        self.inner.read().await.clone()
    }

    async fn save(&self, value: &str) -> Result<(), Error> {
        *self.inner.write().await = value.to_string();
        Ok(())
    }
}
