//! `tapedeck resolve <page> --url <u> --element <selector>` – what an element downloads.

use anyhow::Result;
use tapedeck_core::config::TapedeckConfig;
use tapedeck_core::locator::Locator;

use super::{find_element, load_page};
use crate::cli::PageArgs;

pub fn run_resolve(cfg: &TapedeckConfig, args: &PageArgs, element: &str) -> Result<()> {
    let (site, doc) = load_page(args)?;
    let locator = Locator::with_max_depth(site, cfg.max_ancestor_depth)?;
    let node = find_element(&doc, element)?;

    match locator.locate(&doc, node) {
        Some(reference) => println!("{} {}", reference.classification, reference.canonical_url),
        None => {
            let reference = locator.page_reference(&doc);
            println!(
                "{} {}  (page fallback)",
                reference.classification, reference.canonical_url
            );
        }
    }
    Ok(())
}
