//! Download request synthesis: validated preferences, page metadata and the
//! resolved reference become one `ytdl:?...` URI for the external downloader.
//!
//! Parameter order is fixed: `url`, `template`, `output`, `custom`,
//! `embedThumbnail`, `addMetadata`, `noOverwrites`, `cookiesData`. Only `url`
//! and `output` are always present.

mod encode;
mod template;

pub use template::{
    album_context, example_path, extension_segment, normalize_path, output_template, ALBUM_TOKEN,
    INDEX_TOKEN, TITLE_AND_EXT, UPLOADER_TOKEN,
};

use url::Url;

use crate::config::TapedeckConfig;
use crate::cookies::{self, CookieExport};
use crate::dom::Document;
use crate::locator::ResourceReference;
use crate::metadata::ResourceMetadata;
use crate::prefs::{self, SettingsStore, UserPreferences};
use crate::site::Site;
use crate::validate::{check_custom_params, check_path, ValidationRejection};

/// Knobs the builder takes from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub scheme: String,
    pub path_separator: String,
    /// The cookie container is attached only when longer than this (trimmed).
    pub min_cookie_container_len: usize,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::from(&TapedeckConfig::default())
    }
}

impl From<&TapedeckConfig> for RequestOptions {
    fn from(cfg: &TapedeckConfig) -> Self {
        Self {
            scheme: cfg.scheme.clone(),
            path_separator: cfg.path_separator.clone(),
            min_cookie_container_len: cfg.min_cookie_container_len,
        }
    }
}

/// The finished request. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    uri: String,
    resource: Url,
    output: String,
    cookies_attached: bool,
}

impl DownloadRequest {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn resource(&self) -> &Url {
        &self.resource
    }

    /// Output template, before encoding.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn cookies_attached(&self) -> bool {
        self.cookies_attached
    }

    pub fn into_uri(self) -> String {
        self.uri
    }
}

impl std::fmt::Display for DownloadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

pub struct RequestBuilder<'s> {
    options: RequestOptions,
    store: &'s mut dyn SettingsStore,
}

impl<'s> RequestBuilder<'s> {
    pub fn new(options: RequestOptions, store: &'s mut dyn SettingsStore) -> Self {
        Self { options, store }
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Validates `prefs`, composes the URI and remembers the accepted
    /// preferences for `site`. Cookies are read from `doc` when enabled.
    ///
    /// A validation rejection aborts the build; nothing is persisted then.
    pub fn build(
        &mut self,
        site: Site,
        doc: &Document,
        reference: &ResourceReference,
        metadata: &ResourceMetadata,
        prefs: &UserPreferences,
    ) -> Result<DownloadRequest, ValidationRejection> {
        let accepted = accept(prefs)?;
        let cookies = accepted
            .use_cookies
            .then(|| cookies::export(doc.location(), doc.cookie()));
        let request = compose(
            &self.options,
            site,
            reference,
            metadata,
            &accepted,
            cookies.as_ref(),
        );

        if let Err(e) = prefs::save(&mut *self.store, site, &accepted) {
            tracing::warn!(%site, "could not save preferences: {e}");
        }
        tracing::info!(
            %site,
            url = %request.resource,
            output = %request.output,
            cookies = request.cookies_attached,
            "built download request"
        );
        Ok(request)
    }
}

/// Trims and validates user input; the result is what gets used and remembered.
fn accept(prefs: &UserPreferences) -> Result<UserPreferences, ValidationRejection> {
    let path = prefs.path.trim();
    check_path(path)?;
    let custom = prefs.custom_params.trim();
    check_custom_params(custom)?;
    Ok(UserPreferences {
        path: path.to_string(),
        custom_params: custom.to_string(),
        ..prefs.clone()
    })
}

/// Pure URI assembly from already validated preferences.
pub fn compose(
    options: &RequestOptions,
    site: Site,
    reference: &ResourceReference,
    metadata: &ResourceMetadata,
    prefs: &UserPreferences,
    cookies: Option<&CookieExport>,
) -> DownloadRequest {
    let output = output_template(prefs, album_context(site, metadata), &options.path_separator);

    let mut query = encode::QueryBuilder::default();
    query.push("url", reference.canonical_url.as_str());
    if !prefs.template.is_empty() {
        query.push("template", &prefs.template);
    }
    query.push("output", &output);
    if !prefs.custom_params.is_empty() {
        query.push("custom", &prefs.custom_params);
    }
    query.flag("embedThumbnail", prefs.embed_thumbnail);
    query.flag("addMetadata", prefs.add_metadata);
    query.flag("noOverwrites", prefs.no_overwrites);

    let cookies_attached = match cookies {
        Some(jar) if jar.text.trim().len() > options.min_cookie_container_len => {
            query.push_encoded("cookiesData", encode::base64_component(&jar.text));
            true
        }
        Some(_) => {
            tracing::debug!("cookie container too short, not attached");
            false
        }
        None => false,
    };

    DownloadRequest {
        uri: query.finish(&options.scheme),
        resource: reference.canonical_url.clone(),
        output,
        cookies_attached,
    }
}
