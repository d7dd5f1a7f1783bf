//! Data model shared between the gateway, the controller and presentation
//!
//! The wire format is a JSON object keyed by domain name:
//!
//! ```json
//! {
//!   "example.com": {
//!     "external_ip": "203.0.113.7",
//!     "dns_ip": "203.0.113.7",
//!     "status": "OK",
//!     "status_class": "success",
//!     "last_check": "2025-01-09 12:00:00"
//!   }
//! }
//! ```
//!
//! Every field is optional; `null` and absent mean the same thing.

use serde::{Deserialize, Deserializer, Serialize};
use indexmap::IndexMap;
use std::fmt;

/// Severity tag used to drive presentation styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    Success,
    Warning,
    Error,
    Info,
}

impl StatusClass {
    /// Parse a wire tag; anything outside the known set degrades to `Info`
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "warning" => Self::Warning,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Non-string values (numbers, objects) also degrade instead of failing the body
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .map(StatusClass::from_tag)
            .unwrap_or(StatusClass::Info))
    }
}

/// Last-known synchronization result for one domain
///
/// Replaced wholesale on every successful fetch; never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainStatus {
    /// Externally observed IP address
    #[serde(default)]
    pub external_ip: Option<String>,

    /// IP address currently published for the domain
    #[serde(default)]
    pub dns_ip: Option<String>,

    /// Free-text human-readable status message
    #[serde(default)]
    pub status: Option<String>,

    /// Severity tag
    #[serde(default)]
    pub status_class: Option<StatusClass>,

    /// Timestamp label, display-only
    #[serde(default)]
    pub last_check: Option<String>,
}

impl DomainStatus {
    /// Severity to render, `Info` when the service sent none
    pub fn severity(&self) -> StatusClass {
        self.status_class.unwrap_or(StatusClass::Info)
    }

    /// True when both addresses are known and agree
    pub fn is_in_sync(&self) -> bool {
        matches!((&self.external_ip, &self.dns_ip), (Some(ext), Some(dns)) if ext == dns)
    }
}

/// Domain name → status, iterated in the order the server listed them
pub type StatusMap = IndexMap<String, DomainStatus>;

/// Aggregate observable state owned by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    /// Normalized endpoint, empty when unconfigured
    pub endpoint: String,
    /// Cached per-domain status
    pub status_map: StatusMap,
    /// A command is in flight
    pub is_loading: bool,
    /// Last user-facing error message
    pub error: Option<String>,
}

impl ControllerState {
    /// Whether presentation should show the dashboard rather than setup
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty()
    }
}
