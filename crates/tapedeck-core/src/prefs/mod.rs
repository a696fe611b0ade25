//! User preferences remembered per site between downloads.
//!
//! Stored as JSON under `<site>_user_settings`; the last accepted path is
//! kept separately under `<site>_last_path`. Reading never fails the flow:
//! store errors and corrupt JSON fall back to defaults with a warning.

mod store;

pub use store::{JsonFileStore, MemoryStore, SettingsStore, StoreError};

use serde::{Deserialize, Serialize};

use crate::site::Site;

/// Save path offered when nothing has been remembered yet.
pub const DEFAULT_PATH: &str = "C:\\Downloads\\";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// Empty when the stored settings carry no path; see [`load`].
    #[serde(default)]
    pub path: String,
    /// Quality selection passed through as downloader flags.
    pub template: String,
    #[serde(rename = "custom")]
    pub custom_params: String,
    #[serde(rename = "chkUploader")]
    pub uploader_folder: bool,
    #[serde(rename = "chkAlbum")]
    pub album_folder: bool,
    #[serde(rename = "chkIndex")]
    pub track_index: bool,
    #[serde(rename = "chkEmbedThumbnail")]
    pub embed_thumbnail: bool,
    #[serde(rename = "chkAddMetadata")]
    pub add_metadata: bool,
    #[serde(rename = "chkNoOverwrites")]
    pub no_overwrites: bool,
    #[serde(rename = "chkUseCookies")]
    pub use_cookies: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            path: DEFAULT_PATH.to_string(),
            template: QualityPreset::Best.template().to_string(),
            custom_params: String::new(),
            uploader_folder: true,
            album_folder: true,
            track_index: false,
            embed_thumbnail: true,
            add_metadata: true,
            no_overwrites: true,
            use_cookies: true,
        }
    }
}

/// The dialog's quality choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityPreset {
    #[default]
    Best,
    M4a,
    Mp3,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 3] = [QualityPreset::Best, QualityPreset::M4a, QualityPreset::Mp3];

    pub fn template(self) -> &'static str {
        match self {
            QualityPreset::Best => "-f b ",
            QualityPreset::M4a => "-f ba[ext=m4a]",
            QualityPreset::Mp3 => "-f ba[ext=mp3]",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityPreset::Best => "best",
            QualityPreset::M4a => "m4a",
            QualityPreset::Mp3 => "mp3",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }

    pub fn from_template(template: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.template() == template)
    }
}

pub fn settings_key(site: Site) -> String {
    format!("{}_user_settings", site.as_str())
}

pub fn last_path_key(site: Site) -> String {
    format!("{}_last_path", site.as_str())
}

/// Preferences to prefill the next request for `site`.
///
/// The saved settings' path wins, then the last accepted path, then `default_path`.
pub fn load(store: &dyn SettingsStore, site: Site, default_path: &str) -> UserPreferences {
    let mut prefs = match read_saved(store, site) {
        Ok(Some(saved)) => saved,
        Ok(None) => UserPreferences {
            path: String::new(),
            ..UserPreferences::default()
        },
        Err(e) => {
            tracing::warn!(%site, "could not load saved preferences: {e:#}");
            UserPreferences {
                path: String::new(),
                ..UserPreferences::default()
            }
        }
    };

    if prefs.path.trim().is_empty() {
        prefs.path = match store.get(&last_path_key(site)) {
            Ok(Some(last)) if !last.trim().is_empty() => last,
            Ok(_) => default_path.to_string(),
            Err(e) => {
                tracing::warn!(%site, "could not read last path: {e}");
                default_path.to_string()
            }
        };
    }
    if prefs.template.is_empty() {
        prefs.template = QualityPreset::Best.template().to_string();
    }
    prefs
}

fn read_saved(store: &dyn SettingsStore, site: Site) -> anyhow::Result<Option<UserPreferences>> {
    let Some(raw) = store.get(&settings_key(site))? else {
        return Ok(None);
    };
    let saved: UserPreferences = serde_json::from_str(&raw)?;
    Ok(Some(saved))
}

/// Remembers accepted preferences and the last path for `site`.
pub fn save(store: &mut dyn SettingsStore, site: Site, prefs: &UserPreferences) -> Result<(), StoreError> {
    // Serializing plain strings and bools cannot fail.
    let json = serde_json::to_string(prefs).unwrap_or_default();
    store.set(&settings_key(site), &json)?;
    store.set(&last_path_key(site), &prefs.path)
}
