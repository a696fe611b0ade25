//! Netscape cookie-file export of the active document's cookies.

use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

pub const NETSCAPE_HEADER: &str =
    "# Netscape HTTP Cookie File\n# This is a generated file! Do not edit.\n\n";

/// Session cookies have no expiry in `document.cookie`; records get one a year out.
const EXPIRY_SECS: u64 = 365 * 24 * 60 * 60;

/// Serialized cookie container and the number of records in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieExport {
    pub text: String,
    pub records: usize,
}

/// Exports `cookie` (raw `name=value; name=value`) for the page at `location`.
pub fn export(location: &Url, cookie: &str) -> CookieExport {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    export_at(location, cookie, now)
}

/// [`export`] with an explicit clock, in seconds since the epoch.
pub fn export_at(location: &Url, cookie: &str, now_secs: u64) -> CookieExport {
    let mut text = String::from(NETSCAPE_HEADER);
    let domain = base_domain(location.host_str().unwrap_or_default());
    let include_subdomains = flag(domain.starts_with('.'));
    let secure = flag(location.scheme() == "https");
    let expires = now_secs + EXPIRY_SECS;

    let mut records = 0;
    for pair in cookie.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        text.push_str(&format!(
            "{domain}\t{include_subdomains}\t/\t{secure}\t{expires}\t{name}\t{value}\n"
        ));
        records += 1;
    }

    if records == 0 {
        tracing::debug!(host = ?location.host_str(), "no cookies to export");
    }
    CookieExport { text, records }
}

/// Registered domain with a leading dot: the two supported sites by suffix,
/// anything else by its last two labels.
pub fn base_domain(host: &str) -> String {
    if host.contains("soundcloud.com") {
        return ".soundcloud.com".to_string();
    }
    if host.contains("bandcamp.com") {
        return ".bandcamp.com".to_string();
    }
    let labels: Vec<&str> = host.split('.').collect();
    let start = labels.len().saturating_sub(2);
    format!(".{}", labels[start..].join("."))
}

fn flag(on: bool) -> &'static str {
    if on {
        "TRUE"
    } else {
        "FALSE"
    }
}
