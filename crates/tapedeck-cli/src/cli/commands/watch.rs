//! `tapedeck watch <page> --url <u> --fragment <file>...` – observation driver on a saved page.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tapedeck_core::augment::{observe, AugmentationController, Mutation, PageSession};
use tapedeck_core::config::TapedeckConfig;
use tapedeck_core::dom::Document;
use tapedeck_core::locator::Locator;
use tokio::sync::mpsc;

use super::{find_element, load_page, print_control, print_control_header};
use crate::cli::PageArgs;

pub async fn run_watch(
    cfg: &TapedeckConfig,
    args: &PageArgs,
    fragments: &[PathBuf],
    into: &str,
    interval_ms: u64,
) -> Result<()> {
    let (site, mut doc) = load_page(args)?;
    let target = find_element(&doc, into)?;
    let markup = fragments
        .iter()
        .map(|path| {
            std::fs::read_to_string(path).with_context(|| format!("read fragment {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let controller =
        AugmentationController::with_locator(Locator::with_max_depth(site, cfg.max_ancestor_depth)?)?;
    let mut session = PageSession::new(cfg.quiet_window());
    let (tx, rx) = mpsc::channel::<Mutation>(16);

    let interval = Duration::from_millis(interval_ms);
    let linger = cfg.quiet_window() * 2;
    let producer = tokio::spawn(async move {
        for (i, fragment) in markup.into_iter().enumerate() {
            tokio::time::sleep(interval).await;
            let mutation: Mutation = Box::new(move |doc: &mut Document| {
                if let Err(e) = doc.append_markup(target, &fragment) {
                    tracing::warn!(fragment = i, "fragment not applied: {e}");
                }
            });
            if tx.send(mutation).await.is_err() {
                break;
            }
        }
        // Stay subscribed long enough for the last quiet window to pass.
        tokio::time::sleep(linger).await;
    });

    let stats = observe(rx, &mut doc, &controller, &mut session).await;
    producer.await.context("fragment producer")?;

    println!(
        "{} mutation(s), {} scan(s), {} control(s) inserted",
        stats.mutations, stats.scans, stats.inserted
    );
    if stats.inserted > 0 {
        print_control_header();
        for control in session.controls() {
            print_control(control);
        }
    }
    Ok(())
}
