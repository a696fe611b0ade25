//! Per-page state: handled injection points, inserted controls, the pending scan.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use super::debounce::Debouncer;
use super::Control;
use crate::dom::{Document, NodeId};

/// Identities of injection points already handled.
///
/// Keyed by [`NodeId`], so two elements with identical markup are tracked
/// separately. Ids of nodes removed from the page can be dropped with
/// [`ProcessedSet::prune`].
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    ids: HashSet<NodeId>,
}

impl ProcessedSet {
    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns false if `id` was already present.
    pub fn insert(&mut self, id: NodeId) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Forgets nodes no longer attached to `doc`; returns how many were dropped.
    pub fn prune(&mut self, doc: &Document) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| doc.is_connected(*id));
        before - self.ids.len()
    }
}

/// Everything the controller remembers about one page, from load to unload.
#[derive(Debug)]
pub struct PageSession {
    pub processed: ProcessedSet,
    pub debouncer: Debouncer,
    controls: BTreeMap<NodeId, Control>,
}

impl PageSession {
    pub fn new(quiet_window: Duration) -> Self {
        Self {
            processed: ProcessedSet::default(),
            debouncer: Debouncer::new(quiet_window),
            controls: BTreeMap::new(),
        }
    }

    pub(super) fn bind(&mut self, control: Control) {
        self.controls.insert(control.node, control);
    }

    /// The control whose button is `node`.
    pub fn control(&self, node: NodeId) -> Option<&Control> {
        self.controls.get(&node)
    }

    /// Inserted controls in insertion order.
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.controls.values()
    }

    /// Drops bookkeeping for nodes that left the page.
    pub fn prune(&mut self, doc: &Document) {
        let dropped = self.processed.prune(doc);
        self.controls.retain(|node, _| doc.is_connected(*node));
        if dropped > 0 {
            tracing::debug!(dropped, "pruned detached injection points");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Selector;
    use url::Url;

    #[test]
    fn prune_drops_only_disconnected_nodes() {
        let mut doc = Document::parse(
            r#"<ul><li class="x"></li><li class="x"></li></ul>"#,
            Url::parse("https://soundcloud.com/").unwrap(),
        )
        .unwrap();
        let items = doc.query_all(doc.root(), &Selector::parse("li.x").unwrap());
        let mut set = ProcessedSet::default();
        assert!(set.insert(items[0]));
        assert!(set.insert(items[1]));
        assert!(!set.insert(items[1]));

        doc.remove(items[0]);
        assert_eq!(set.prune(&doc), 1);
        assert!(!set.contains(items[0]));
        assert!(set.contains(items[1]));
    }
}
