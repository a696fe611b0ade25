//! `tapedeck prefs <site>` – remembered preferences for a site.

use anyhow::{Context, Result};
use tapedeck_core::config::TapedeckConfig;
use tapedeck_core::prefs;
use tapedeck_core::site::Site;

use super::open_store;

pub fn run_prefs(cfg: &TapedeckConfig, site: &str) -> Result<()> {
    let site = Site::parse(site).with_context(|| format!("unknown site '{site}' (expected soundcloud or bandcamp)"))?;
    let store = open_store();
    let saved = prefs::load(store.as_ref(), site, &cfg.default_path);
    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}
