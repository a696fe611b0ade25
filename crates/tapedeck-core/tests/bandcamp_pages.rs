//! Integration test: saved Bandcamp album and artist pages.

mod common;

use tapedeck_core::augment::{AugmentationController, ControlKind, PageSession};
use tapedeck_core::config::TapedeckConfig;
use tapedeck_core::flow::{run_download, Host};
use tapedeck_core::locator::{Classification, Locator};
use tapedeck_core::metadata::MetadataExtractor;
use tapedeck_core::prefs::{self, MemoryStore, UserPreferences};
use tapedeck_core::site::Site;
use tapedeck_core::validate::ValidationRejection;

use common::{load_page, raw_param, select, ConfirmingDialog, RecordingNavigator};

const ALBUM_URL: &str = "https://harbourlights.bandcamp.com/album/low-tide";
const MUSIC_URL: &str = "https://harbourlights.bandcamp.com/music";

#[test]
fn album_rows_resolve_to_tracks() {
    let doc = load_page("bandcamp_album.html", ALBUM_URL);
    let locator = Locator::new(Site::Bandcamp).unwrap();
    let resolved: Vec<(String, Classification)> = select(&doc, ".track_row_view .track-title")
        .into_iter()
        .map(|title| {
            let r = locator.resolve(&doc, title);
            (r.canonical_url.to_string(), r.classification)
        })
        .collect();
    assert_eq!(
        resolved,
        vec![
            (
                "https://harbourlights.bandcamp.com/track/breakwater".to_string(),
                Classification::Track
            ),
            (
                "https://harbourlights.bandcamp.com/track/slack-water".to_string(),
                Classification::Track
            ),
            (format!("{ALBUM_URL}?track=30303"), Classification::Track),
        ]
    );
    assert_eq!(locator.page_reference(&doc).classification, Classification::Album);
}

#[test]
fn album_buy_item_downloads_album_with_index() {
    let mut doc = load_page("bandcamp_album.html", ALBUM_URL);
    let controller = AugmentationController::new(Site::Bandcamp).unwrap();
    let mut session = PageSession::new(TapedeckConfig::default().quiet_window());

    let report = controller.scan(&mut doc, &mut session);
    assert_eq!(report.len(), 1);
    assert_eq!(report.inserted[0].kind, ControlKind::BuyItem);
    assert!(controller.scan(&mut doc, &mut session).is_empty());

    let click = select(&doc, ".buyItem .yt-dlp-download")[0];
    let reference = controller.activate(&doc, &session, click).unwrap();
    assert_eq!(reference.canonical_url.as_str(), ALBUM_URL);
    assert_eq!(reference.classification, Classification::Album);

    let config = TapedeckConfig::default();
    let mut store = MemoryStore::new();
    let mut dialog = ConfirmingDialog::with(|p| UserPreferences {
        track_index: true,
        ..p.clone()
    });
    let mut navigator = RecordingNavigator::default();
    let extractor = MetadataExtractor::new(Site::Bandcamp).unwrap();
    let host = Host {
        config: &config,
        store: &mut store,
        dialog: &mut dialog,
        navigator: &mut navigator,
    };
    let request = run_download(host, Site::Bandcamp, &extractor, &doc, &reference)
        .unwrap()
        .unwrap();

    assert_eq!(
        request.output(),
        "C:\\Downloads\\%(uploader)s\\%(album)s\\%(album_index)s. %(title)s.%(ext)s"
    );
    assert_eq!(
        raw_param(request.uri(), "output"),
        Some("C%3A%5CDownloads%5C%25(uploader)s%5C%25(album)s%5C%25(album_index)s.%20%25(title)s.%25(ext)s")
    );
    assert_eq!(navigator.uris.len(), 1);

    let context = &dialog.contexts[0];
    assert!(context.offers_album_options);
    assert_eq!(context.title, "Download options");
    assert!(context.metadata.is_album);
    assert_eq!(context.metadata.track_count, 3);
    assert_eq!(context.metadata.track_name, "Breakwater");
    assert_eq!(context.metadata.album_name, "Low Tide");
    assert_eq!(context.metadata.artist_name, "Harbour Lights");
    // Preview uses the prefill, where the index option is still off.
    assert_eq!(
        context.example_path,
        "C:\\Downloads\\Harbour Lights\\Low Tide\\%(title)s.%(ext)s"
    );
}

#[test]
fn artist_page_downloads_everything() {
    let mut doc = load_page("bandcamp_profile.html", MUSIC_URL);
    let controller = AugmentationController::new(Site::Bandcamp).unwrap();
    let mut session = PageSession::new(TapedeckConfig::default().quiet_window());

    let report = controller.scan(&mut doc, &mut session);
    assert_eq!(report.len(), 1);
    let control = &report.inserted[0];
    assert_eq!(control.kind, ControlKind::BandProfile);
    assert_eq!(doc.text_content(control.node), "Download All");

    let config = TapedeckConfig::default();
    let mut store = MemoryStore::new();
    let mut dialog = ConfirmingDialog::with(|p| UserPreferences {
        album_folder: false,
        ..p.clone()
    });
    let mut navigator = RecordingNavigator::default();
    let extractor = MetadataExtractor::new(Site::Bandcamp).unwrap();
    let host = Host {
        config: &config,
        store: &mut store,
        dialog: &mut dialog,
        navigator: &mut navigator,
    };
    let request = run_download(host, Site::Bandcamp, &extractor, &doc, &control.reference)
        .unwrap()
        .unwrap();

    assert_eq!(
        raw_param(request.uri(), "url"),
        Some("https%3A%2F%2Fharbourlights.bandcamp.com%2Fmusic")
    );
    assert_eq!(request.output(), "C:\\Downloads\\%(uploader)s\\%(title)s.%(ext)s");

    let context = &dialog.contexts[0];
    assert_eq!(context.title, "Download artist options");
    assert!(context.offers_album_options);
    assert!(context.metadata.is_profile);
    assert_eq!(
        context.example_path,
        "C:\\Downloads\\Harbour Lights\\album_name\\%(title)s.%(ext)s"
    );
}

#[test]
fn invalid_path_is_rejected_and_forgotten() {
    let doc = load_page("bandcamp_album.html", ALBUM_URL);
    let reference = Locator::new(Site::Bandcamp).unwrap().page_reference(&doc);

    let config = TapedeckConfig::default();
    let mut store = MemoryStore::new();
    let mut dialog = ConfirmingDialog::with(|p| UserPreferences {
        path: "D:\\music|tee".into(),
        ..p.clone()
    });
    let mut navigator = RecordingNavigator::default();
    let extractor = MetadataExtractor::new(Site::Bandcamp).unwrap();
    let host = Host {
        config: &config,
        store: &mut store,
        dialog: &mut dialog,
        navigator: &mut navigator,
    };
    let err = run_download(host, Site::Bandcamp, &extractor, &doc, &reference).unwrap_err();

    assert_eq!(err, ValidationRejection::InvalidPath);
    assert_eq!(err.to_string(), "Invalid path. Path contains invalid characters.");
    assert!(navigator.uris.is_empty());
    assert_eq!(prefs::load(&store, Site::Bandcamp, "X:\\").path, "X:\\");
}
