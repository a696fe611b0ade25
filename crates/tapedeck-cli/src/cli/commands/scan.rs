//! `tapedeck scan <page> --url <u>` – cold-start scan of a saved page.

use anyhow::Result;
use tapedeck_core::augment::{AugmentationController, PageSession};
use tapedeck_core::config::TapedeckConfig;
use tapedeck_core::locator::Locator;

use super::{load_page, print_control, print_control_header};
use crate::cli::PageArgs;

pub fn run_scan(cfg: &TapedeckConfig, args: &PageArgs) -> Result<()> {
    let (site, mut doc) = load_page(args)?;
    let controller =
        AugmentationController::with_locator(Locator::with_max_depth(site, cfg.max_ancestor_depth)?)?;
    let mut session = PageSession::new(cfg.quiet_window());

    let report = controller.scan(&mut doc, &mut session);
    if report.is_empty() {
        println!("No injection points found on this {site} page.");
        return Ok(());
    }
    print_control_header();
    for control in &report.inserted {
        print_control(control);
    }
    Ok(())
}
