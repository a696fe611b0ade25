//! Bandcamp rules: track rows and buy items carry a link or an item id.

use url::Url;

use super::{absolutize, Classification, ResourceReference};
use crate::dom::{Document, NodeId, Selector, SelectorError};

pub(super) struct Rules {
    row_or_buy_item: Selector,
    item_id: Selector,
    item_link: Selector,
    band_header: Selector,
    track_title: Selector,
    track_rows: Selector,
}

impl Rules {
    pub(super) fn new() -> Result<Self, SelectorError> {
        Ok(Self {
            row_or_buy_item: Selector::parse(".track_row_view, .buyItem")?,
            item_id: Selector::parse("[data-item-id]")?,
            item_link: Selector::parse(r#"a[href*="/track/"], a[href*="/album/"]"#)?,
            band_header: Selector::parse("#band-name-location")?,
            track_title: Selector::parse(".trackTitle")?,
            track_rows: Selector::parse(".track_list .track_row_view")?,
        })
    }

    pub(super) fn resolve(&self, doc: &Document, element: NodeId) -> Option<ResourceReference> {
        let item = doc
            .closest(element, &self.row_or_buy_item)
            .or_else(|| doc.closest(element, &self.item_id))?;

        if let Some(reference) = self.linked(doc, item) {
            return Some(reference);
        }

        let item_id = doc.attribute(item, "data-item-id").map(str::trim)?;
        if item_id.is_empty() || !doc.location().as_str().contains("/album/") {
            return None;
        }
        Some(ResourceReference::new(
            track_on_album(doc.location(), item_id),
            Classification::Track,
        ))
    }

    fn linked(&self, doc: &Document, item: NodeId) -> Option<ResourceReference> {
        let link = doc.query(item, &self.item_link)?;
        let href = doc.attribute(link, "href")?;
        let origin = doc.location().origin().ascii_serialization();
        let url = absolutize(&origin, href)?;
        let classification = if href.contains("/album/") {
            Classification::Album
        } else {
            Classification::Track
        };
        Some(ResourceReference::new(url, classification))
    }

    pub(super) fn page_classification(&self, doc: &Document) -> Classification {
        if doc.contains(&self.band_header) && !doc.contains(&self.track_title) {
            Classification::Profile
        } else if doc.query_all(doc.root(), &self.track_rows).len() > 1 {
            Classification::Album
        } else {
            Classification::Track
        }
    }
}

/// Album page URL with its query replaced by `track=<id>`. Derived, not a literal link.
fn track_on_album(page: &Url, item_id: &str) -> Url {
    let mut url = page.clone();
    url.set_fragment(None);
    url.set_query(Some(&format!("track={item_id}")));
    url
}
