//! Endpoint normalization
//!
//! Turns user input into the base address the gateway is built from:
//!
//! 1. Blank input (empty or whitespace-only) → `""` (unconfigured).
//! 2. Input not starting with `http` gets an `http://` prefix.
//! 3. A single trailing `/` is appended when missing.
//!
//! Non-blank input is not trimmed. Normalizing twice yields the same result.

/// Normalize a user-entered endpoint
///
/// # Examples
///
/// ```
/// use ipsync_core::normalize_endpoint;
///
/// assert_eq!(normalize_endpoint("example.com:7777"), "http://example.com:7777/");
/// assert_eq!(normalize_endpoint("https://host/"), "https://host/");
/// assert_eq!(normalize_endpoint("   "), "");
/// ```
pub fn normalize_endpoint(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let mut endpoint = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    if !endpoint.ends_with('/') {
        endpoint.push('/');
    }

    endpoint
}
