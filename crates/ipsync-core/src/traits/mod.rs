//! Core traits for IPSync
//!
//! - [`ConfigStore`]: Durable storage of the endpoint
//! - [`StatusGateway`]: Wire calls to the remote status service
//! - [`GatewayFactory`]: Builds a gateway for an endpoint

pub mod config_store;
pub mod gateway;

pub use config_store::ConfigStore;
pub use gateway::{GatewayFactory, StatusGateway};
