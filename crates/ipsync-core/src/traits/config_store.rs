// # Config Store Trait
//
// Defines the interface for persisting the single configuration value: the
// normalized endpoint of the remote service.
//
// ## Implementations
//
// - File-based: JSON document with atomic writes and backup recovery
// - Memory: for tests and embedding
//
// ## Usage
//
// ```rust,ignore
// use ipsync_core::ConfigStore;
//
// let endpoint = store.load().await;          // "" when never set
// store.save("http://10.0.0.5:7777/").await?; // durable once resolved
// ```
//
// Normalization is NOT performed here; callers store what they want loaded.

use async_trait::async_trait;

/// Trait for config store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently. Concurrent `save` calls
/// resolve last-write-wins.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the persisted endpoint
    ///
    /// Never fails: a missing or unreadable store yields the empty string.
    async fn load(&self) -> String;

    /// Persist the endpoint, overwriting any previous value
    ///
    /// The value is durable once the returned future resolves with `Ok`.
    async fn save(&self, value: &str) -> Result<(), crate::Error>;
}
