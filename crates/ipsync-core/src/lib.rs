// # ipsync-core
//
// Client-side core for IPSync: tracks the synchronization status of remote
// domains and lets the user trigger a bulk re-sync.
//
// ## Architecture Overview
//
// - **ConfigStore**: Trait for persisting the single configuration value (the endpoint)
// - **StatusGateway**: Trait for the two wire calls to the remote service
// - **GatewayFactory**: Builds a gateway for a given endpoint (fallible, no I/O)
// - **StatusSyncController**: Owns observable state and the user commands
//
// ## Data Flow
//
// presentation reads state → calls a command → controller calls the gateway →
// gateway talks to the remote service → controller updates state → presentation
// re-renders.
//
// The library holds no HTTP client of its own; see `ipsync-gateway-http`.

pub mod controller;
pub mod error;
pub mod model;
pub mod normalize;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use controller::StatusSyncController;
pub use error::{Error, ErrorClass, Result};
pub use model::{ControllerState, DomainStatus, StatusClass, StatusMap};
pub use normalize::normalize_endpoint;
pub use store::{FileConfigStore, MemoryConfigStore};
pub use traits::{ConfigStore, GatewayFactory, StatusGateway};
