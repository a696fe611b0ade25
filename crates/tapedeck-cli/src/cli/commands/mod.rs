//! CLI command handlers. Each command is in its own file.

mod cookies;
mod info;
mod prefs;
mod request;
mod resolve;
mod scan;
mod watch;

pub use cookies::run_cookies;
pub use info::run_info;
pub use prefs::run_prefs;
pub use request::run_request;
pub use resolve::run_resolve;
pub use scan::run_scan;
pub use watch::run_watch;

use anyhow::{Context, Result};
use tapedeck_core::augment::Control;
use tapedeck_core::dom::{Document, NodeId, Selector};
use tapedeck_core::prefs::{JsonFileStore, MemoryStore, SettingsStore};
use tapedeck_core::site::Site;
use url::Url;

use super::PageArgs;

/// Reads the snapshot and sets up the browsing context it came from.
fn load_page(args: &PageArgs) -> Result<(Site, Document)> {
    let location = parse_location(&args.url)?;
    let site = Site::from_url(&location)
        .with_context(|| format!("unsupported page {location} (expected soundcloud.com or bandcamp.com)"))?;
    let markup = std::fs::read_to_string(&args.page)
        .with_context(|| format!("read page snapshot {}", args.page.display()))?;
    let doc = Document::parse(&markup, location)
        .with_context(|| format!("parse page snapshot {}", args.page.display()))?
        .with_cookie(args.cookie.as_str());
    tracing::debug!(%site, page = %args.page.display(), "loaded page snapshot");
    Ok((site, doc))
}

/// The user's settings store. If no state directory is available the
/// preferences live for this run only.
fn open_store() -> Box<dyn SettingsStore> {
    match JsonFileStore::default_path() {
        Ok(path) => Box::new(JsonFileStore::open_or_empty(path)),
        Err(e) => {
            tracing::warn!("no settings location, preferences not remembered: {e:#}");
            Box::new(MemoryStore::new())
        }
    }
}

fn parse_location(url: &str) -> Result<Url> {
    Url::parse(url).with_context(|| format!("invalid page url '{url}'"))
}

/// First element matching `selector`, or an error naming it.
fn find_element(doc: &Document, selector: &str) -> Result<NodeId> {
    let compiled = Selector::parse(selector).with_context(|| format!("invalid selector '{selector}'"))?;
    doc.query(doc.root(), &compiled)
        .with_context(|| format!("no element matches '{selector}'"))
}

fn print_control_header() {
    println!("{:<13} {:<8} {}", "KIND", "TYPE", "URL");
}

fn print_control(control: &Control) {
    println!(
        "{:<13} {:<8} {}",
        control.kind.as_str(),
        control.reference.classification.as_str(),
        control.reference.canonical_url
    );
}
