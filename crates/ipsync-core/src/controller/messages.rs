//! User-facing error messages
//!
//! Wording is not load-bearing, but each failure class must read differently:
//! configuration, remote rejection (with status code), transport (with cause).

use crate::error::Error;

pub(super) fn invalid_endpoint(error: &Error) -> String {
    format!("Invalid endpoint: {}", cause(error))
}

pub(super) fn fetch_failure(error: &Error) -> String {
    match error {
        Error::Rejected { status } => format!("Fetch failed: {status}"),
        other => format!("Network error: {}", cause(other)),
    }
}

pub(super) fn sync_failure(error: &Error) -> String {
    match error {
        Error::Rejected { status } => format!("Sync failed: {status}"),
        other => format!("Sync network error: {}", cause(other)),
    }
}

pub(super) fn storage(error: &Error) -> String {
    format!("Could not save configuration: {}", cause(error))
}

/// The underlying description without the variant prefix
fn cause(error: &Error) -> String {
    match error {
        Error::InvalidEndpoint(msg) | Error::Transport(msg) | Error::ConfigStore(msg) => {
            msg.clone()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_distinguishable() {
        let rejected = fetch_failure(&Error::rejected(500));
        let transport = fetch_failure(&Error::transport("connection refused"));
        let invalid = invalid_endpoint(&Error::invalid_endpoint("no host"));

        assert_eq!(rejected, "Fetch failed: 500");
        assert_eq!(transport, "Network error: connection refused");
        assert_eq!(invalid, "Invalid endpoint: no host");
    }

    #[test]
    fn test_sync_messages() {
        assert_eq!(sync_failure(&Error::rejected(403)), "Sync failed: 403");
        assert_eq!(
            sync_failure(&Error::transport("timed out")),
            "Sync network error: timed out"
        );
    }
}
