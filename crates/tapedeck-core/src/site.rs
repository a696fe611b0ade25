//! Supported catalog sites, detected once from the page origin.

use serde::{Deserialize, Serialize};
use url::Url;

/// Fixed origin used to absolutize SoundCloud's site-relative links.
pub const SOUNDCLOUD_ORIGIN: &str = "https://soundcloud.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    SoundCloud,
    Bandcamp,
}

impl Site {
    /// Detects the site from a page URL; `None` for unsupported hosts.
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_ascii_lowercase();
        if host_is_under(&host, "soundcloud.com") {
            Some(Site::SoundCloud)
        } else if host_is_under(&host, "bandcamp.com") {
            Some(Site::Bandcamp)
        } else {
            None
        }
    }

    /// Namespace used for persisted settings keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Site::SoundCloud => "soundcloud",
            Site::Bandcamp => "bandcamp",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soundcloud" => Some(Site::SoundCloud),
            "bandcamp" => Some(Site::Bandcamp),
            _ => None,
        }
    }

    /// Only Bandcamp exposes albums in this flow; album and index folders are offered there only.
    pub fn supports_albums(self) -> bool {
        matches!(self, Site::Bandcamp)
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn host_is_under(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
