//! `tapedeck request <page> --url <u> [options]` – run the activation flow.
//!
//! The flags play the options dialog: whatever is not given keeps the
//! remembered preference.

use anyhow::Result;
use tapedeck_core::config::TapedeckConfig;
use tapedeck_core::flow::{run_download, DialogContext, Host, Navigator, OptionsDialog};
use tapedeck_core::locator::Locator;
use tapedeck_core::metadata::MetadataExtractor;
use tapedeck_core::prefs::UserPreferences;

use super::{find_element, load_page, open_store};
use crate::cli::{OptionArgs, PageArgs};

pub fn run_request(
    cfg: &TapedeckConfig,
    args: &PageArgs,
    element: Option<&str>,
    options: &OptionArgs,
    open: bool,
) -> Result<()> {
    let (site, doc) = load_page(args)?;
    let locator = Locator::with_max_depth(site, cfg.max_ancestor_depth)?;
    let reference = match element {
        Some(selector) => locator.resolve(&doc, find_element(&doc, selector)?),
        None => locator.page_reference(&doc),
    };
    let extractor = MetadataExtractor::new(site)?;

    let mut store = open_store();
    let mut dialog = FlagsDialog::new(options.clone());
    let mut navigator: Box<dyn Navigator> = if open {
        Box::new(XdgOpen)
    } else {
        Box::new(Stdout)
    };
    let host = Host {
        config: cfg,
        store: store.as_mut(),
        dialog: &mut dialog,
        navigator: navigator.as_mut(),
    };

    if run_download(host, site, &extractor, &doc, &reference)?.is_none() {
        println!("Dismissed.");
    }
    Ok(())
}

/// Answers the dialog from command-line flags.
pub(crate) struct FlagsDialog {
    options: OptionArgs,
}

impl FlagsDialog {
    pub(crate) fn new(options: OptionArgs) -> Self {
        Self { options }
    }

    pub(crate) fn answer(&self, context: &DialogContext) -> UserPreferences {
        let o = &self.options;
        let mut prefs = context.prefill.clone();
        if let Some(path) = &o.path {
            prefs.path = path.clone();
        }
        if let Some(quality) = o.quality {
            prefs.template = quality.template().to_string();
        }
        if let Some(custom) = &o.custom {
            prefs.custom_params = custom.clone();
        }
        let set = |target: &mut bool, value: Option<bool>| {
            if let Some(v) = value {
                *target = v;
            }
        };
        set(&mut prefs.uploader_folder, o.uploader_folder);
        set(&mut prefs.embed_thumbnail, o.embed_thumbnail);
        set(&mut prefs.add_metadata, o.add_metadata);
        set(&mut prefs.no_overwrites, o.no_overwrites);
        set(&mut prefs.use_cookies, o.use_cookies);
        // Album options are not offered outside album contexts; they keep their value.
        if context.offers_album_options {
            set(&mut prefs.album_folder, o.album_folder);
            set(&mut prefs.track_index, o.track_index);
        } else if o.album_folder.is_some() || o.track_index.is_some() {
            tracing::debug!(site = %context.site, "album options ignored outside album context");
        }
        prefs
    }
}

impl OptionsDialog for FlagsDialog {
    fn collect(&mut self, context: &DialogContext) -> Option<UserPreferences> {
        eprintln!("{}: {}", context.title, context.reference.canonical_url);
        eprintln!("  example: {}", context.example_path);
        Some(self.answer(context))
    }
}

struct Stdout;

impl Navigator for Stdout {
    fn navigate(&mut self, uri: &str) {
        println!("{uri}");
    }
}

/// Hands the URI to the desktop's scheme handler without waiting for it.
struct XdgOpen;

impl Navigator for XdgOpen {
    fn navigate(&mut self, uri: &str) {
        match std::process::Command::new("xdg-open").arg(uri).spawn() {
            Ok(child) => tracing::info!(pid = child.id(), "handed uri to xdg-open"),
            Err(e) => tracing::warn!("xdg-open failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use tapedeck_core::locator::{Classification, ResourceReference};
    use tapedeck_core::metadata::ResourceMetadata;
    use tapedeck_core::prefs::QualityPreset;
    use tapedeck_core::site::Site;
    use url::Url;

    use super::*;

    fn context(site: Site, is_album: bool) -> DialogContext {
        DialogContext::new(
            site,
            ResourceReference::new(
                Url::parse("https://x.bandcamp.com/album/y").unwrap(),
                Classification::Album,
            ),
            ResourceMetadata {
                is_album,
                ..ResourceMetadata::default()
            },
            UserPreferences::default(),
            &TapedeckConfig::default(),
        )
    }

    #[test]
    fn flags_override_prefill() {
        let dialog = FlagsDialog::new(OptionArgs {
            path: Some("E:\\Music".into()),
            quality: Some(QualityPreset::M4a),
            embed_thumbnail: Some(false),
            track_index: Some(true),
            ..OptionArgs::default()
        });
        let answer = dialog.answer(&context(Site::Bandcamp, true));
        assert_eq!(answer.path, "E:\\Music");
        assert_eq!(answer.template, "-f ba[ext=m4a]");
        assert!(!answer.embed_thumbnail);
        assert!(answer.track_index);
        assert!(answer.uploader_folder);
    }

    #[test]
    fn album_flags_ignored_without_album_context() {
        let dialog = FlagsDialog::new(OptionArgs {
            album_folder: Some(false),
            track_index: Some(true),
            ..OptionArgs::default()
        });
        let answer = dialog.answer(&context(Site::SoundCloud, false));
        assert!(answer.album_folder);
        assert!(!answer.track_index);
    }
}
