//! Augmentation controller: keeps exactly one download control next to every
//! valid injection point while the page changes underneath it.
//!
//! A scan walks the site's selector tables, skips points already in the
//! session's [`ProcessedSet`], resolves each new point and inserts a control
//! bound to the resolved reference. Points whose structure is not ready yet
//! are left unprocessed and retried on the next scan. Scanning an unchanged
//! page again inserts nothing.

mod bandcamp;
mod debounce;
mod observer;
mod session;
mod soundcloud;

pub use debounce::Debouncer;
pub use observer::{observe, Mutation, ObserveStats};
pub use session::{PageSession, ProcessedSet};

use crate::dom::{Document, NodeId, SelectorError};
use crate::locator::{Locator, ResourceReference};
use crate::site::Site;

/// What an inserted control downloads, by where it was injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// SoundCloud profile header: the whole artist.
    Profile,
    /// SoundCloud track inside a profile list.
    Track,
    /// SoundCloud single-track page.
    SingleTrack,
    /// Bandcamp digital buy item.
    BuyItem,
    /// Bandcamp artist or label page: everything.
    BandProfile,
}

impl ControlKind {
    /// Marker class carried by the inserted control; also the duplicate guard.
    pub fn marker_class(self) -> &'static str {
        match self {
            ControlKind::Profile => "sc-button-download-profile",
            ControlKind::Track => "sc-button-download-track",
            ControlKind::SingleTrack => "sc-button-download-single-track",
            ControlKind::BuyItem => "yt-dlp-download",
            ControlKind::BandProfile => "yt-dlp-download-profile",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlKind::Profile => "Download artist",
            ControlKind::Track | ControlKind::SingleTrack => "yt-dl Download",
            ControlKind::BuyItem => "Download",
            ControlKind::BandProfile => "Download All",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ControlKind::Profile => "profile",
            ControlKind::Track => "track",
            ControlKind::SingleTrack => "single-track",
            ControlKind::BuyItem => "buy-item",
            ControlKind::BandProfile => "band-profile",
        }
    }
}

impl std::fmt::Display for ControlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inserted control and the resource it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// The inserted button.
    pub node: NodeId,
    /// The injection point it was inserted for.
    pub anchor: NodeId,
    pub kind: ControlKind,
    pub reference: ResourceReference,
}

/// Controls inserted by one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub inserted: Vec<Control>,
}

impl ScanReport {
    pub fn len(&self) -> usize {
        self.inserted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty()
    }
}

enum Rules {
    SoundCloud(soundcloud::Rules),
    Bandcamp(bandcamp::Rules),
}

pub struct AugmentationController {
    site: Site,
    locator: Locator,
    rules: Rules,
}

impl AugmentationController {
    pub fn new(site: Site) -> Result<Self, SelectorError> {
        Self::with_locator(Locator::new(site)?)
    }

    /// Uses a preconfigured locator; the site is taken from it.
    pub fn with_locator(locator: Locator) -> Result<Self, SelectorError> {
        let site = locator.site();
        let rules = match site {
            Site::SoundCloud => Rules::SoundCloud(soundcloud::Rules::new()?),
            Site::Bandcamp => Rules::Bandcamp(bandcamp::Rules::new()?),
        };
        Ok(Self {
            site,
            locator,
            rules,
        })
    }

    pub fn site(&self) -> Site {
        self.site
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// One full pass over the page. Candidates are independent: one that
    /// cannot be handled yet never stops the others.
    pub fn scan(&self, doc: &mut Document, session: &mut PageSession) -> ScanReport {
        let inserted = match &self.rules {
            Rules::SoundCloud(rules) => rules.scan(&self.locator, doc, session),
            Rules::Bandcamp(rules) => rules.scan(&self.locator, doc, session),
        };
        for control in &inserted {
            tracing::info!(
                kind = %control.kind,
                classification = %control.reference.classification,
                url = %control.reference.canonical_url,
                "inserted download control"
            );
            session.bind(control.clone());
        }
        ScanReport { inserted }
    }

    /// The reference a click on `node` downloads: the bound reference of the
    /// control containing it, or `None` when `node` is not part of a control.
    pub fn activate(&self, doc: &Document, session: &PageSession, node: NodeId) -> Option<ResourceReference> {
        std::iter::once(node)
            .chain(doc.ancestors(node))
            .find_map(|n| session.control(n))
            .map(|control| control.reference.clone())
    }
}
