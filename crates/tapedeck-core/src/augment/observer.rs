//! Change observation driver: cold-start scan, then one scan per quiet period.

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::session::PageSession;
use super::{AugmentationController, ScanReport};
use crate::dom::Document;

/// A host-side change to the page (nodes added, removed, rewritten).
pub type Mutation = Box<dyn FnOnce(&mut Document) + Send>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserveStats {
    pub mutations: usize,
    pub scans: usize,
    pub inserted: usize,
}

impl ObserveStats {
    fn record(&mut self, report: &ScanReport) {
        self.scans += 1;
        self.inserted += report.len();
    }
}

/// Runs until every sender of `events` is dropped (the unsubscribe path).
///
/// Each received mutation is applied to `doc` and re-arms the session's
/// debouncer; a scan runs only once the quiet window passes without
/// further mutations. A scan still pending at unsubscribe is discarded.
pub async fn observe(
    mut events: mpsc::Receiver<Mutation>,
    doc: &mut Document,
    controller: &AugmentationController,
    session: &mut PageSession,
) -> ObserveStats {
    let mut stats = ObserveStats::default();
    stats.record(&controller.scan(doc, session));

    loop {
        let deadline = session.debouncer.deadline();
        tokio::select! {
            event = events.recv() => match event {
                Some(mutation) => {
                    mutation(doc);
                    stats.mutations += 1;
                    session.debouncer.notify(Instant::now());
                }
                None => {
                    if session.debouncer.is_pending() {
                        tracing::debug!("observer unsubscribed with a scan pending");
                    }
                    session.debouncer.cancel();
                    break;
                }
            },
            _ = wait_until(deadline) => {
                if session.debouncer.fire(Instant::now()) {
                    session.prune(doc);
                    let report = controller.scan(doc, session);
                    tracing::debug!(inserted = report.len(), "debounced scan");
                    stats.record(&report);
                }
            }
        }
    }

    stats
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
