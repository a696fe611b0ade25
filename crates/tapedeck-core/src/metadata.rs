//! Metadata extractor: what the current page shows (names, track count,
//! album or profile mode).
//!
//! Reads only document-level markers, never the element that triggered a
//! download. On an artist page with many tracks the metadata therefore
//! describes the page, not the particular row that was activated.

use serde::Serialize;

use crate::dom::{Document, Selector, SelectorError};
use crate::site::Site;

pub const TRACK_PLACEHOLDER: &str = "track_name";
pub const ARTIST_PLACEHOLDER: &str = "artist_name";
pub const FIRST_TRACK_PLACEHOLDER: &str = "first_track";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    pub track_name: String,
    pub artist_name: String,
    pub album_name: String,
    pub track_count: usize,
    pub is_album: bool,
    pub is_profile: bool,
}

impl ResourceMetadata {
    fn profile(artist_name: String) -> Self {
        Self {
            artist_name,
            is_profile: true,
            ..Self::default()
        }
    }
}

struct SoundCloudMarkers {
    profile_header: Selector,
    profile_name: Vec<Selector>,
    og_title: Selector,
    uploader: Selector,
}

struct BandcampMarkers {
    band_header: Selector,
    track_title: Selector,
    artist_name: Vec<Selector>,
    track_rows: Selector,
    album_title: Selector,
    row_title: Selector,
}

enum Markers {
    SoundCloud(SoundCloudMarkers),
    Bandcamp(BandcampMarkers),
}

pub struct MetadataExtractor {
    markers: Markers,
}

impl MetadataExtractor {
    pub fn new(site: Site) -> Result<Self, SelectorError> {
        let markers = match site {
            Site::SoundCloud => Markers::SoundCloud(SoundCloudMarkers {
                profile_header: Selector::parse(".profileHeader")?,
                profile_name: alternatives(&[".profileHeader__userName a", "h1.profileHeader__userName"])?,
                og_title: Selector::parse(r#"meta[property="og:title"]"#)?,
                uploader: Selector::parse("h2.soundTitle__username a")?,
            }),
            Site::Bandcamp => Markers::Bandcamp(BandcampMarkers {
                band_header: Selector::parse("#band-name-location")?,
                track_title: Selector::parse(".trackTitle")?,
                artist_name: alternatives(&["#band-name-location .title", "h3 span a"])?,
                track_rows: Selector::parse(".track_list .track_row_view")?,
                album_title: Selector::parse("h2.trackTitle")?,
                row_title: Selector::parse(".track-title")?,
            }),
        };
        Ok(Self { markers })
    }

    pub fn extract(&self, doc: &Document) -> ResourceMetadata {
        match &self.markers {
            Markers::SoundCloud(m) => soundcloud(doc, m),
            Markers::Bandcamp(m) => bandcamp(doc, m),
        }
    }
}

fn soundcloud(doc: &Document, m: &SoundCloudMarkers) -> ResourceMetadata {
    if doc.contains(&m.profile_header) {
        let artist = first_selected_text(doc, &m.profile_name);
        return ResourceMetadata::profile(or_placeholder(artist, ARTIST_PLACEHOLDER));
    }
    let title = doc
        .query(doc.root(), &m.og_title)
        .and_then(|meta| doc.attribute(meta, "content"))
        .map(|c| c.trim().to_string());
    ResourceMetadata {
        track_name: or_placeholder(title, TRACK_PLACEHOLDER),
        artist_name: or_placeholder(first_text(doc, &m.uploader), ARTIST_PLACEHOLDER),
        album_name: String::new(),
        track_count: 1,
        is_album: false,
        is_profile: false,
    }
}

fn bandcamp(doc: &Document, m: &BandcampMarkers) -> ResourceMetadata {
    let artist = first_selected_text(doc, &m.artist_name);
    if !doc.contains(&m.track_title) && doc.contains(&m.band_header) {
        return ResourceMetadata::profile(or_placeholder(artist, ARTIST_PLACEHOLDER));
    }

    let rows = doc.query_all(doc.root(), &m.track_rows);
    let is_album = rows.len() > 1;
    let track_name = if is_album {
        let first_row = rows
            .first()
            .and_then(|row| doc.query(*row, &m.row_title))
            .map(|t| doc.text_content(t).trim().to_string());
        or_placeholder(first_row, FIRST_TRACK_PLACEHOLDER)
    } else {
        or_placeholder(first_text(doc, &m.track_title), TRACK_PLACEHOLDER)
    };

    ResourceMetadata {
        track_name,
        artist_name: or_placeholder(artist, ARTIST_PLACEHOLDER),
        album_name: first_text(doc, &m.album_title).unwrap_or_default(),
        track_count: rows.len().max(1),
        is_album,
        is_profile: false,
    }
}

/// Trimmed text of the first match in document order.
fn first_text(doc: &Document, selector: &Selector) -> Option<String> {
    doc.query(doc.root(), selector)
        .map(|n| doc.text_content(n).trim().to_string())
}

/// Text of the first alternative that matches anything; earlier alternatives
/// win even when a later one appears first in the document.
fn first_selected_text(doc: &Document, alternatives: &[Selector]) -> Option<String> {
    alternatives.iter().find_map(|alt| first_text(doc, alt))
}

fn alternatives(selectors: &[&str]) -> Result<Vec<Selector>, SelectorError> {
    selectors.iter().map(|s| Selector::parse(s)).collect()
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => placeholder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn extract(site: Site, markup: &str, location: &str) -> ResourceMetadata {
        let doc = Document::parse(markup, Url::parse(location).unwrap()).unwrap();
        MetadataExtractor::new(site).unwrap().extract(&doc)
    }

    #[test]
    fn soundcloud_track_page() {
        let md = extract(
            Site::SoundCloud,
            r#"<meta property="og:title" content=" Night Drive "><h2 class="soundTitle__username"><a href="/dj">DJ Person</a></h2>"#,
            "https://soundcloud.com/dj/night-drive",
        );
        assert_eq!(md.track_name, "Night Drive");
        assert_eq!(md.artist_name, "DJ Person");
        assert_eq!(md.track_count, 1);
        assert!(!md.is_album && !md.is_profile);
    }

    #[test]
    fn soundcloud_placeholders_when_markers_missing() {
        let md = extract(Site::SoundCloud, "<p>empty</p>", "https://soundcloud.com/a/b");
        assert_eq!(md.track_name, TRACK_PLACEHOLDER);
        assert_eq!(md.artist_name, ARTIST_PLACEHOLDER);
        assert_eq!(md.album_name, "");
    }

    #[test]
    fn soundcloud_profile_reads_only_artist() {
        let md = extract(
            Site::SoundCloud,
            r#"<div class="profileHeader"><h1 class="profileHeader__userName">Someone</h1></div><meta property="og:title" content="x">"#,
            "https://soundcloud.com/someone",
        );
        assert!(md.is_profile);
        assert_eq!(md.artist_name, "Someone");
        assert_eq!(md.track_name, "");
        assert_eq!(md.track_count, 0);
    }

    #[test]
    fn bandcamp_album_page() {
        let md = extract(
            Site::Bandcamp,
            r#"<h2 class="trackTitle">The Album</h2>
               <p id="band-name-location"><span class="title">The Band</span></p>
               <table class="track_list">
                 <tr class="track_row_view"><td><span class="track-title">Opener</span></td></tr>
                 <tr class="track_row_view"><td><span class="track-title">Closer</span></td></tr>
               </table>"#,
            "https://band.bandcamp.com/album/the-album",
        );
        assert!(md.is_album);
        assert_eq!(md.track_count, 2);
        assert_eq!(md.track_name, "Opener");
        assert_eq!(md.album_name, "The Album");
        assert_eq!(md.artist_name, "The Band");
    }

    #[test]
    fn bandcamp_single_track_page() {
        let md = extract(
            Site::Bandcamp,
            r#"<h2 class="trackTitle">Lone Song</h2><h3><span><a href="/">Band</a></span></h3>"#,
            "https://band.bandcamp.com/track/lone-song",
        );
        assert!(!md.is_album);
        assert_eq!(md.track_count, 1);
        assert_eq!(md.track_name, "Lone Song");
        assert_eq!(md.artist_name, "Band");
    }

    #[test]
    fn bandcamp_profile_page() {
        let md = extract(
            Site::Bandcamp,
            r#"<p id="band-name-location"><span class="title">Label</span></p>"#,
            "https://label.bandcamp.com/",
        );
        assert!(md.is_profile);
        assert_eq!(md.artist_name, "Label");
        assert_eq!(md.track_count, 0);
    }

    #[test]
    fn earlier_alternative_wins_over_document_order() {
        let md = extract(
            Site::Bandcamp,
            r#"<h3><span><a>Fallback</a></span></h3><p id="band-name-location"><span class="title">Preferred</span></p><h2 class="trackTitle">T</h2>"#,
            "https://x.bandcamp.com/track/t",
        );
        assert_eq!(md.artist_name, "Preferred");
    }
}
