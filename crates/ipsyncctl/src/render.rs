//! Plain-text rendering of the status cache

use ipsync_core::{DomainStatus, StatusClass, StatusMap};
use std::fmt::Write;

/// One block per domain, in map order
pub fn status_table(map: &StatusMap) -> String {
    if map.is_empty() {
        return "No domains reported.\n".to_string();
    }

    let width = map.keys().map(String::len).max().unwrap_or(0);
    let mut out = String::new();
    for (domain, status) in map {
        let _ = writeln!(
            out,
            "{} {:<width$}  {}",
            marker(status.severity()),
            domain,
            status.status.as_deref().unwrap_or("-"),
        );
        let _ = writeln!(out, "  {}", details(status));
    }
    out
}

fn marker(class: StatusClass) -> &'static str {
    match class {
        StatusClass::Success => "[ok]  ",
        StatusClass::Warning => "[warn]",
        StatusClass::Error => "[err] ",
        StatusClass::Info => "[info]",
    }
}

fn details(status: &DomainStatus) -> String {
    format!(
        "external {}  dns {}  checked {}",
        status.external_ip.as_deref().unwrap_or("?"),
        status.dns_ip.as_deref().unwrap_or("?"),
        status.last_check.as_deref().unwrap_or("never"),
    )
}
