//! Activation flow: what happens after a download control is clicked.
//!
//! Preferences are loaded as the dialog's prefill, the dialog answers (or is
//! dismissed), the request is built from the answer and the URI is handed to
//! the navigator.

use crate::config::TapedeckConfig;
use crate::dom::Document;
use crate::locator::{Classification, ResourceReference};
use crate::metadata::{MetadataExtractor, ResourceMetadata};
use crate::prefs::{self, SettingsStore, UserPreferences};
use crate::request::{album_context, example_path, DownloadRequest, RequestBuilder, RequestOptions};
use crate::site::Site;
use crate::validate::ValidationRejection;

/// One-way hand-off of the finished URI to whatever handles the scheme.
pub trait Navigator {
    fn navigate(&mut self, uri: &str);
}

/// Collects the user's choices. `None` means the dialog was dismissed.
pub trait OptionsDialog {
    fn collect(&mut self, context: &DialogContext) -> Option<UserPreferences>;
}

/// Everything the options dialog shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogContext {
    pub site: Site,
    pub reference: ResourceReference,
    pub metadata: ResourceMetadata,
    pub prefill: UserPreferences,
    /// Album folder and track index options are only offered here.
    pub offers_album_options: bool,
    /// Follows what was activated, not what the page shows: a track listed
    /// on an artist page gets "Download options", only the artist control
    /// gets "Download artist options".
    pub title: &'static str,
    /// Preview of the first output file for the prefilled preferences.
    pub example_path: String,
}

impl DialogContext {
    pub fn new(
        site: Site,
        reference: ResourceReference,
        metadata: ResourceMetadata,
        prefill: UserPreferences,
        config: &TapedeckConfig,
    ) -> Self {
        let title = match reference.classification {
            Classification::Profile => "Download artist options",
            _ => "Download options",
        };
        let example_path = example_path(
            site,
            &metadata,
            &prefill,
            &config.default_path,
            &config.path_separator,
        );
        Self {
            site,
            offers_album_options: album_context(site, &metadata),
            title,
            example_path,
            reference,
            metadata,
            prefill,
        }
    }
}

/// The host side of a download: settings, dialog and navigation.
pub struct Host<'a> {
    pub config: &'a TapedeckConfig,
    pub store: &'a mut dyn SettingsStore,
    pub dialog: &'a mut dyn OptionsDialog,
    pub navigator: &'a mut dyn Navigator,
}

/// Runs one activation for `reference` on `doc`.
///
/// Returns `Ok(None)` when the dialog is dismissed. A rejected answer is
/// returned to the caller; nothing is navigated or persisted then.
pub fn run_download(
    host: Host<'_>,
    site: Site,
    extractor: &MetadataExtractor,
    doc: &Document,
    reference: &ResourceReference,
) -> Result<Option<DownloadRequest>, ValidationRejection> {
    let Host {
        config,
        store,
        dialog,
        navigator,
    } = host;

    let prefill = prefs::load(&*store, site, &config.default_path);
    let metadata = extractor.extract(doc);
    let context = DialogContext::new(site, reference.clone(), metadata, prefill, config);

    let Some(mut answer) = dialog.collect(&context) else {
        tracing::debug!(%site, url = %reference.canonical_url, "options dialog dismissed");
        return Ok(None);
    };
    if answer.path.trim().is_empty() {
        answer.path = config.default_path.clone();
    }

    let request = RequestBuilder::new(RequestOptions::from(config), store).build(
        site,
        doc,
        reference,
        &context.metadata,
        &answer,
    )?;
    navigator.navigate(request.uri());
    Ok(Some(request))
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::prefs::MemoryStore;

    #[derive(Default)]
    struct Recorder {
        uris: Vec<String>,
    }

    impl Navigator for Recorder {
        fn navigate(&mut self, uri: &str) {
            self.uris.push(uri.to_string());
        }
    }

    /// Answers with the prefill after applying `edit`, remembering what it saw.
    struct Scripted<F> {
        edit: Option<F>,
        seen: Option<DialogContext>,
    }

    impl<F: FnOnce(&mut UserPreferences)> OptionsDialog for Scripted<F> {
        fn collect(&mut self, context: &DialogContext) -> Option<UserPreferences> {
            self.seen = Some(context.clone());
            let edit = self.edit.take()?;
            let mut answer = context.prefill.clone();
            edit(&mut answer);
            Some(answer)
        }
    }

    fn answering<F: FnOnce(&mut UserPreferences)>(edit: F) -> Scripted<F> {
        Scripted {
            edit: Some(edit),
            seen: None,
        }
    }

    fn album_page() -> Document {
        Document::parse(
            r#"<div id="name-section"><h2 class="trackTitle">Y</h2><h3><span><a href="/">Band</a></span></h3></div>
               <table class="track_list">
                 <tr class="track_row_view"><td><span class="track-title">One</span></td></tr>
                 <tr class="track_row_view"><td><span class="track-title">Two</span></td></tr>
               </table>"#,
            Url::parse("https://band.bandcamp.com/album/y").unwrap(),
        )
        .unwrap()
    }

    fn album_reference() -> ResourceReference {
        ResourceReference::new(
            Url::parse("https://band.bandcamp.com/album/y").unwrap(),
            Classification::Album,
        )
    }

    #[test]
    fn confirmed_dialog_navigates_once() {
        let config = TapedeckConfig::default();
        let mut store = MemoryStore::default();
        let mut dialog = answering(|p: &mut UserPreferences| p.path = "D:\\Music".into());
        let mut navigator = Recorder::default();
        let doc = album_page();
        let extractor = MetadataExtractor::new(Site::Bandcamp).unwrap();

        let host = Host {
            config: &config,
            store: &mut store,
            dialog: &mut dialog,
            navigator: &mut navigator,
        };
        let request = run_download(host, Site::Bandcamp, &extractor, &doc, &album_reference())
            .unwrap()
            .unwrap();

        assert_eq!(navigator.uris, vec![request.uri().to_string()]);
        assert_eq!(
            request.output(),
            "D:\\Music\\%(uploader)s\\%(album)s\\%(title)s.%(ext)s"
        );

        let seen = dialog.seen.unwrap();
        assert_eq!(seen.title, "Download options");
        assert!(seen.offers_album_options);
        assert!(seen.metadata.is_album);
        assert_eq!(seen.prefill.path, config.default_path);
        assert_eq!(seen.example_path, "C:\\Downloads\\Band\\Y\\%(title)s.%(ext)s");

        // The accepted path prefills the next activation.
        assert_eq!(prefs::load(&store, Site::Bandcamp, "unused").path, "D:\\Music");
    }

    #[test]
    fn dismissed_dialog_builds_nothing() {
        let config = TapedeckConfig::default();
        let mut store = MemoryStore::default();
        let mut dialog: Scripted<fn(&mut UserPreferences)> = Scripted {
            edit: None,
            seen: None,
        };
        let mut navigator = Recorder::default();
        let extractor = MetadataExtractor::new(Site::Bandcamp).unwrap();

        let host = Host {
            config: &config,
            store: &mut store,
            dialog: &mut dialog,
            navigator: &mut navigator,
        };
        let outcome = run_download(host, Site::Bandcamp, &extractor, &album_page(), &album_reference());
        assert_eq!(outcome, Ok(None));
        assert!(navigator.uris.is_empty());
        assert!(dialog.seen.is_some());
        assert_eq!(store.get(&prefs::settings_key(Site::Bandcamp)).unwrap(), None);
    }

    #[test]
    fn rejected_answer_is_returned_and_not_navigated() {
        let config = TapedeckConfig::default();
        let mut store = MemoryStore::default();
        let mut dialog = answering(|p: &mut UserPreferences| p.custom_params = "--exec rm -rf ~ && echo".into());
        let mut navigator = Recorder::default();
        let extractor = MetadataExtractor::new(Site::Bandcamp).unwrap();

        let host = Host {
            config: &config,
            store: &mut store,
            dialog: &mut dialog,
            navigator: &mut navigator,
        };
        let outcome = run_download(host, Site::Bandcamp, &extractor, &album_page(), &album_reference());
        assert_eq!(outcome, Err(ValidationRejection::UnsafeCustomParams));
        assert!(navigator.uris.is_empty());
        assert_eq!(store.get(&prefs::last_path_key(Site::Bandcamp)).unwrap(), None);
    }

    #[test]
    fn blank_answer_path_falls_back_to_default() {
        let config = TapedeckConfig::default();
        let mut store = MemoryStore::default();
        let mut dialog = answering(|p: &mut UserPreferences| p.path = "   ".into());
        let mut navigator = Recorder::default();
        let extractor = MetadataExtractor::new(Site::Bandcamp).unwrap();

        let host = Host {
            config: &config,
            store: &mut store,
            dialog: &mut dialog,
            navigator: &mut navigator,
        };
        let request = run_download(host, Site::Bandcamp, &extractor, &album_page(), &album_reference())
            .unwrap()
            .unwrap();
        assert!(request.output().starts_with("C:\\Downloads\\%(uploader)s"));
    }

    #[test]
    fn profile_reference_gets_artist_title() {
        let doc = Document::parse(
            r#"<div class="profileHeader"><h1 class="profileHeader__userName">Someone</h1></div>"#,
            Url::parse("https://soundcloud.com/someone").unwrap(),
        )
        .unwrap();
        let metadata = MetadataExtractor::new(Site::SoundCloud).unwrap().extract(&doc);
        let context = DialogContext::new(
            Site::SoundCloud,
            ResourceReference::new(doc.location().clone(), Classification::Profile),
            metadata,
            UserPreferences::default(),
            &TapedeckConfig::default(),
        );
        assert_eq!(context.title, "Download artist options");
        assert!(!context.offers_album_options);
    }
}
