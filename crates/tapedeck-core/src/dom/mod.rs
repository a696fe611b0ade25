//! In-process model of the host page.
//!
//! The document is an arena of nodes addressed by [`NodeId`]. Slots are never
//! reused, so a `NodeId` is a stable identity for the lifetime of the page:
//! two elements with identical tags and attributes are still distinct nodes.
//! Removed subtrees keep their ids but are no longer connected to the root.

mod cursor;
mod markup;
mod selector;

pub use markup::MarkupError;
pub use selector::{Selector, SelectorError};

use url::Url;

/// Identity of a node within one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A loaded page: node tree plus the browsing-context state the core reads
/// (location and the raw `document.cookie` string).
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    location: Url,
    cookie: String,
}

const ROOT_TAG: &str = "#document";

impl Document {
    /// Empty document at `location`.
    pub fn new(location: Url) -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element {
                tag: ROOT_TAG.to_string(),
                attrs: Vec::new(),
            },
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            location,
            cookie: String::new(),
        }
    }

    /// Reads a page snapshot.
    pub fn parse(markup: &str, location: Url) -> Result<Self, MarkupError> {
        let mut doc = Self::new(location);
        let root = doc.root;
        markup::parse_into(&mut doc, root, markup)?;
        Ok(doc)
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = cookie.into();
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn set_location(&mut self, location: Url) {
        self.location = location;
    }

    /// Raw `name=value; name=value` cookie string of the active document.
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn set_cookie(&mut self, cookie: impl Into<String>) {
        self.cookie = cookie.into();
    }

    /// The `<body>` element, or the root when the snapshot has none.
    pub fn body(&self) -> NodeId {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.tag_name(*id) == Some("body"))
            .unwrap_or(self.root)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).map(|n| &n.data),
            Some(NodeData::Element { .. })
        )
    }

    /// Lowercase tag name; `None` for text nodes.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        if let NodeData::Element { attrs, .. } = &mut node.data {
            match attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name.to_ascii_lowercase(), value.to_string())),
            }
        }
    }

    /// Class-list membership (whitespace-separated `class` attribute).
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .map(|v| v.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// All nodes below `id` in document (pre-)order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(NodeData::Text(t)) = self.node(id).map(|n| &n.data) {
            return t.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| match &self.node(d)?.data {
                NodeData::Text(t) => Some(t.as_str()),
                NodeData::Element { .. } => None,
            })
            .collect()
    }

    /// True while the node is still attached under the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(id.0).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.retain(|c| *c != id);
        }
    }

    /// Refuses moves that would make a node its own ancestor.
    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        self.node(parent).is_some()
            && self.node(child).is_some()
            && child != self.root
            && parent != child
            && !self.ancestors(parent).any(|a| a == child)
    }

    /// Appends `child` (moving it if attached elsewhere). False if the move is invalid.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.can_adopt(parent, child) {
            return false;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        true
    }

    /// Inserts `new` as the previous sibling of `reference`. False if `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) -> bool {
        let Some(parent) = self.parent(reference) else {
            return false;
        };
        if new == reference || !self.can_adopt(parent, new) {
            return false;
        }
        self.detach(new);
        let siblings = &mut self.nodes[parent.0].children;
        let index = siblings
            .iter()
            .position(|c| *c == reference)
            .unwrap_or(siblings.len());
        siblings.insert(index, new);
        self.nodes[new.0].parent = Some(parent);
        true
    }

    /// Detaches a subtree from the page.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// Parses `markup` and appends the resulting nodes under `parent`.
    pub fn append_markup(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        markup::parse_into(self, parent, markup)
    }

    /// Nearest inclusive ancestor element matching `selector` (DOM `closest`).
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| selector.matches(self, *n))
    }

    /// First descendant of `scope` matching `selector` (DOM `querySelector`).
    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|n| selector.matches(self, *n))
    }

    /// All descendants of `scope` matching `selector`, in document order.
    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| selector.matches(self, *n))
            .collect()
    }

    /// Document-wide existence check.
    pub fn contains(&self, selector: &Selector) -> bool {
        self.query(self.root, selector).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(markup: &str) -> Document {
        Document::parse(markup, Url::parse("https://example.com/page").unwrap()).unwrap()
    }

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn closest_is_inclusive_and_walks_up() {
        let d = doc(r#"<div class="outer"><div class="inner"><span id="x">hi</span></div></div>"#);
        let span = d.query(d.root(), &sel("#x")).unwrap();
        assert_eq!(d.closest(span, &sel("span")), Some(span));
        let outer = d.closest(span, &sel(".outer")).unwrap();
        assert!(d.has_class(outer, "outer"));
        assert!(d.closest(span, &sel(".missing")).is_none());
    }

    #[test]
    fn query_matches_against_ancestors_outside_scope() {
        let d = doc(r#"<div class="title"><p><a href="/a">a</a></p></div>"#);
        let p = d.query(d.root(), &sel("p")).unwrap();
        // `.title a` matches even though `.title` is above the scope element.
        assert!(d.query(p, &sel(".title a")).is_some());
    }

    #[test]
    fn insert_before_places_previous_sibling() {
        let mut d = doc(r#"<div id="g"><button id="more"></button></div>"#);
        let more = d.query(d.root(), &sel("#more")).unwrap();
        let btn = d.create_element("button");
        assert!(d.insert_before(more, btn));
        let group = d.query(d.root(), &sel("#g")).unwrap();
        assert_eq!(d.children(group), &[btn, more]);
    }

    #[test]
    fn insert_before_needs_parent() {
        let mut d = doc("");
        let a = d.create_element("a");
        let b = d.create_element("b");
        assert!(!d.insert_before(a, b));
    }

    #[test]
    fn append_child_rejects_cycles() {
        let mut d = doc(r#"<div id="a"><div id="b"></div></div>"#);
        let a = d.query(d.root(), &sel("#a")).unwrap();
        let b = d.query(d.root(), &sel("#b")).unwrap();
        assert!(!d.append_child(b, a));
        assert_eq!(d.parent(b), Some(a));
    }

    #[test]
    fn removed_nodes_are_disconnected() {
        let mut d = doc(r#"<ul><li id="one">1</li></ul>"#);
        let li = d.query(d.root(), &sel("#one")).unwrap();
        assert!(d.is_connected(li));
        d.remove(li);
        assert!(!d.is_connected(li));
        assert!(d.query(d.root(), &sel("#one")).is_none());
    }

    #[test]
    fn identical_elements_have_distinct_ids() {
        let d = doc(r#"<i class="x"></i><i class="x"></i>"#);
        let all = d.query_all(d.root(), &sel("i.x"));
        assert_eq!(all.len(), 2);
        assert_ne!(all[0], all[1]);
    }

    #[test]
    fn text_content_concatenates() {
        let d = doc("<h2>Hello <b>World</b></h2>");
        let h2 = d.query(d.root(), &sel("h2")).unwrap();
        assert_eq!(d.text_content(h2), "Hello World");
    }
}
