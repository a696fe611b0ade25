//! SoundCloud injection points: the "more" button of a button group, on
//! profile headers, on tracks listed on a profile, and on single-track pages.

use url::Url;

use super::session::PageSession;
use super::{Control, ControlKind};
use crate::dom::{Document, NodeId, Selector, SelectorError};
use crate::locator::{Classification, Locator, ResourceReference};

const BUTTON_CLASSES: &str = "sc-button sc-button-secondary sc-button-medium sc-button-icon sc-button-responsive";

const ICON: &str = r#"<div><svg viewBox="0 0 16 16" xmlns="http://www.w3.org/2000/svg" aria-hidden="true"><path d="M8 15A7 7 0 108 1a7 7 0 000 14zm3.47-7.53l1.06 1.06L8 13.06 3.47 8.53l1.06-1.06 2.72 2.72V3h1.5v7.19l2.72-2.72z" fill="currentColor"></path></svg></div>"#;

pub(super) struct Rules {
    profile_header: Selector,
    profile_more: Selector,
    list_more: Selector,
    /// Regions whose "more" buttons belong to another rule.
    foreign_regions: Selector,
    sound_body: Selector,
    sound: Selector,
    single_more: Selector,
    button_group: Selector,
    queue_button: Selector,
    profile_marker: Selector,
    track_marker: Selector,
    single_marker: Selector,
}

impl Rules {
    pub(super) fn new() -> Result<Self, SelectorError> {
        let marker = |kind: ControlKind| Selector::parse(&format!(".{}", kind.marker_class()));
        Ok(Self {
            profile_header: Selector::parse(".profileHeader")?,
            profile_more: Selector::parse(".userInfoBar__buttons .sc-button-more")?,
            list_more: Selector::parse(".sound__soundActions .soundActions.soundActions__medium .sc-button-more")?,
            foreign_regions: Selector::parse(".userInfoBar__buttons, .trackItem__actions, .listenEngagement__actions")?,
            sound_body: Selector::parse(".sound__body")?,
            sound: Selector::parse(".sound")?,
            single_more: Selector::parse(
                ".listenEngagement__actions .sc-button-more, .soundActions.listenEngagement__actions .sc-button-more",
            )?,
            button_group: Selector::parse(".sc-button-group")?,
            queue_button: Selector::parse(".sc-button-queue")?,
            profile_marker: marker(ControlKind::Profile)?,
            track_marker: marker(ControlKind::Track)?,
            single_marker: marker(ControlKind::SingleTrack)?,
        })
    }

    /// Duplicate guard for `kind`; `None` for kinds this site never inserts.
    pub(super) fn marker(&self, kind: ControlKind) -> Option<&Selector> {
        match kind {
            ControlKind::Profile => Some(&self.profile_marker),
            ControlKind::Track => Some(&self.track_marker),
            ControlKind::SingleTrack => Some(&self.single_marker),
            ControlKind::BuyItem | ControlKind::BandProfile => None,
        }
    }

    pub(super) fn scan(&self, locator: &Locator, doc: &mut Document, session: &mut PageSession) -> Vec<Control> {
        let location = doc.location().clone();
        let mut inserted = Vec::new();

        if doc.contains(&self.profile_header) {
            let profile = ResourceReference::new(location.clone(), Classification::Profile);
            for anchor in doc.query_all(doc.root(), &self.profile_more) {
                inserted.extend(self.add_button(doc, session, anchor, ControlKind::Profile, &profile));
            }

            for anchor in doc.query_all(doc.root(), &self.list_more) {
                if session.processed.contains(anchor) || doc.closest(anchor, &self.foreign_regions).is_some() {
                    continue;
                }
                let Some(body) = self.sound_body(doc, anchor) else {
                    tracing::debug!(?anchor, "track has no sound body yet");
                    continue;
                };
                // The profile URL is never a valid result for a listed track.
                let Some(reference) = locator
                    .locate(doc, body)
                    .filter(|r| r.canonical_url != location)
                else {
                    tracing::debug!(?anchor, "track link not rendered yet");
                    continue;
                };
                inserted.extend(self.add_button(doc, session, anchor, ControlKind::Track, &reference));
            }
        } else if is_track_url(&location) {
            let track = ResourceReference::new(location.clone(), Classification::Track);
            for anchor in doc.query_all(doc.root(), &self.single_more) {
                if session.processed.contains(anchor) {
                    continue;
                }
                let has_queue = doc
                    .closest(anchor, &self.button_group)
                    .is_some_and(|group| doc.query(group, &self.queue_button).is_some());
                if has_queue {
                    inserted.extend(self.add_button(doc, session, anchor, ControlKind::SingleTrack, &track));
                }
            }
        }
        inserted
    }

    /// `.sound__body` around the anchor, or inside its enclosing `.sound`.
    fn sound_body(&self, doc: &Document, anchor: NodeId) -> Option<NodeId> {
        doc.closest(anchor, &self.sound_body).or_else(|| {
            let sound = doc.closest(anchor, &self.sound)?;
            doc.query(sound, &self.sound_body)
        })
    }

    /// Inserts a control right before `anchor` inside its button group.
    fn add_button(
        &self,
        doc: &mut Document,
        session: &mut PageSession,
        anchor: NodeId,
        kind: ControlKind,
        reference: &ResourceReference,
    ) -> Option<Control> {
        if session.processed.contains(anchor) {
            return None;
        }
        let Some(marker) = self.marker(kind) else {
            tracing::warn!(%kind, "not a SoundCloud control");
            return None;
        };
        let group = doc.closest(anchor, &self.button_group)?;
        if doc.query(group, marker).is_some() {
            tracing::debug!(?anchor, %kind, "control already present in group");
            session.processed.insert(anchor);
            return None;
        }

        let button = doc.create_element("button");
        doc.set_attribute(button, "type", "button");
        doc.set_attribute(button, "class", &format!("{} {BUTTON_CLASSES}", kind.marker_class()));
        doc.set_attribute(button, "title", kind.label());
        doc.set_attribute(button, "aria-label", kind.label());
        if let Err(e) = doc.append_markup(button, ICON) {
            tracing::debug!("icon markup rejected: {e}");
        }
        let label = doc.create_element("span");
        doc.set_attribute(label, "class", "sc-button-label sc-visuallyhidden");
        let text = doc.create_text(kind.label());
        doc.append_child(label, text);
        doc.append_child(button, label);

        if !doc.insert_before(anchor, button) {
            return None;
        }
        session.processed.insert(anchor);
        Some(Control {
            node: button,
            anchor,
            kind,
            reference: reference.clone(),
        })
    }
}

/// `soundcloud.com/<user>/<track>`, excluding sets and artist listings.
pub(super) fn is_track_url(url: &Url) -> bool {
    let on_soundcloud = url
        .host_str()
        .is_some_and(|h| h == "soundcloud.com" || h.ends_with(".soundcloud.com"));
    let segments = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).count())
        .unwrap_or(0);
    let path = url.path();
    on_soundcloud && segments >= 2 && !path.contains("/sets/") && !path.contains("/artists/")
}
