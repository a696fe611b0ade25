//! Bandcamp injection points: the audio-quality line of each digital buy
//! item, and the band header of artist and label pages.

use super::session::PageSession;
use super::{Control, ControlKind};
use crate::dom::{Document, NodeId, Selector, SelectorError};
use crate::locator::{Classification, Locator, ResourceReference};

const LINK_CLASS: &str = "buy-link";

pub(super) struct Rules {
    audio_quality: Selector,
    buy_marker: Selector,
    band_header: Selector,
    track_title: Selector,
    profile_marker: Selector,
}

impl Rules {
    pub(super) fn new() -> Result<Self, SelectorError> {
        Ok(Self {
            audio_quality: Selector::parse(".buyItem.digital .audio-quality")?,
            buy_marker: Selector::parse(&format!(".{}", ControlKind::BuyItem.marker_class()))?,
            band_header: Selector::parse("#band-name-location")?,
            track_title: Selector::parse(".trackTitle")?,
            profile_marker: Selector::parse(&format!(".{}", ControlKind::BandProfile.marker_class()))?,
        })
    }

    pub(super) fn scan(&self, locator: &Locator, doc: &mut Document, session: &mut PageSession) -> Vec<Control> {
        let mut inserted = Vec::new();

        for anchor in doc.query_all(doc.root(), &self.audio_quality) {
            if session.processed.contains(anchor) {
                continue;
            }
            let already = doc
                .parent(anchor)
                .is_some_and(|parent| doc.query(parent, &self.buy_marker).is_some());
            if already {
                session.processed.insert(anchor);
                continue;
            }
            let button = new_button(doc, ControlKind::BuyItem);
            if !doc.append_child(anchor, button) {
                continue;
            }
            session.processed.insert(anchor);
            // Resolved from the control itself, the way a click would.
            let reference = locator.resolve(doc, button);
            inserted.push(Control {
                node: button,
                anchor,
                kind: ControlKind::BuyItem,
                reference,
            });
        }

        if let Some(control) = self.band_profile(doc, session) {
            inserted.push(control);
        }
        inserted
    }

    /// One "Download All" control on artist and label pages.
    fn band_profile(&self, doc: &mut Document, session: &mut PageSession) -> Option<Control> {
        let header = doc.query(doc.root(), &self.band_header)?;
        if session.processed.contains(header) || doc.contains(&self.track_title) {
            return None;
        }
        if doc.query(header, &self.profile_marker).is_some() {
            session.processed.insert(header);
            return None;
        }
        let button = new_button(doc, ControlKind::BandProfile);
        if !doc.append_child(header, button) {
            return None;
        }
        session.processed.insert(header);
        Some(Control {
            node: button,
            anchor: header,
            kind: ControlKind::BandProfile,
            reference: ResourceReference::new(doc.location().clone(), Classification::Profile),
        })
    }
}

fn new_button(doc: &mut Document, kind: ControlKind) -> NodeId {
    let button = doc.create_element("button");
    doc.set_attribute(button, "class", &format!("{} {LINK_CLASS}", kind.marker_class()));
    let text = doc.create_text(kind.label());
    doc.append_child(button, text);
    button
}
