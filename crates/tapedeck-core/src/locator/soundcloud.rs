//! SoundCloud rules: every track in a feed or profile list lives in a
//! `.sound__body` container carrying its own title link.

use url::Url;

use super::{absolutize, Classification, ResourceReference};
use crate::dom::{Document, NodeId, Selector, SelectorError};
use crate::site::SOUNDCLOUD_ORIGIN;

const CONTAINER_CLASS: &str = "sound__body";

pub(super) struct Rules {
    max_depth: usize,
    title_link: Selector,
    cover_art: Selector,
    permalink_url: Selector,
    permalink: Selector,
    any_track_link: Selector,
    page_title: Selector,
    page_container: Selector,
    profile_header: Selector,
}

impl Rules {
    pub(super) fn new(max_depth: usize) -> Result<Self, SelectorError> {
        Ok(Self {
            max_depth,
            title_link: Selector::parse(".soundTitle__title a.sc-link-primary")?,
            cover_art: Selector::parse(".sound__coverArt")?,
            permalink_url: Selector::parse("[data-permalink-url]")?,
            permalink: Selector::parse("[data-permalink]")?,
            any_track_link: Selector::parse(
                r#"a[href^="/"]:not([href*="/sets/"]):not([href*="/artists/"]):not([href*="/playlists/"])"#,
            )?,
            page_title: Selector::parse(".soundTitle__title")?,
            page_container: Selector::parse(".sound__body")?,
            profile_header: Selector::parse(".profileHeader")?,
        })
    }

    pub(super) fn resolve(&self, doc: &Document, element: NodeId) -> Option<ResourceReference> {
        if let Some(container) = self.container(doc, element) {
            if let Some(url) = self.from_container(doc, container) {
                let classification = if url.path().contains("/sets/") {
                    Classification::Album
                } else {
                    Classification::Track
                };
                return Some(ResourceReference::new(url, classification));
            }
            tracing::debug!("track container has no usable link");
        }
        // A single-track page: the page URL is the track.
        if doc.contains(&self.page_title) && doc.contains(&self.page_container) {
            return Some(ResourceReference::new(
                doc.location().clone(),
                self.page_classification(doc),
            ));
        }
        None
    }

    pub(super) fn page_classification(&self, doc: &Document) -> Classification {
        if doc.contains(&self.profile_header) {
            Classification::Profile
        } else {
            Classification::Track
        }
    }

    /// Nearest `.sound__body` within `max_depth` levels, counting `element` itself.
    fn container(&self, doc: &Document, element: NodeId) -> Option<NodeId> {
        std::iter::once(element)
            .chain(doc.ancestors(element))
            .take(self.max_depth)
            .find(|id| doc.has_class(*id, CONTAINER_CLASS))
    }

    /// Tries each link source in priority order; the first one that yields a URL wins.
    fn from_container(&self, doc: &Document, container: NodeId) -> Option<Url> {
        self.href_of(doc, container, &self.title_link)
            .or_else(|| self.href_of(doc, container, &self.cover_art))
            .or_else(|| self.permalink(doc, container))
            .or_else(|| self.two_segment_link(doc, container))
    }

    fn href_of(&self, doc: &Document, container: NodeId, selector: &Selector) -> Option<Url> {
        let link = doc.query(container, selector)?;
        absolutize(SOUNDCLOUD_ORIGIN, doc.attribute(link, "href")?)
    }

    fn permalink(&self, doc: &Document, container: NodeId) -> Option<Url> {
        let value = [
            doc.attribute(container, "data-permalink-url"),
            doc.attribute(container, "data-permalink"),
            doc.query(container, &self.permalink_url)
                .and_then(|n| doc.attribute(n, "data-permalink-url")),
            doc.query(container, &self.permalink)
                .and_then(|n| doc.attribute(n, "data-permalink")),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())?;

        if value.starts_with("http") {
            Url::parse(value).ok()
        } else if value.starts_with('/') {
            absolutize(SOUNDCLOUD_ORIGIN, value)
        } else {
            absolutize(SOUNDCLOUD_ORIGIN, &format!("/{value}"))
        }
    }

    /// First `/artist/track`-shaped relative link that is not a set, artist or playlist link.
    fn two_segment_link(&self, doc: &Document, container: NodeId) -> Option<Url> {
        doc.query_all(container, &self.any_track_link)
            .into_iter()
            .filter_map(|link| doc.attribute(link, "href"))
            .find(|href| path_segments(href) == 2)
            .and_then(|href| absolutize(SOUNDCLOUD_ORIGIN, href))
    }
}

fn path_segments(href: &str) -> usize {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).count()
}
