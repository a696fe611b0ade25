//! Output templates: where and under which name the downloader files a resource.

use crate::metadata::{ResourceMetadata, ARTIST_PLACEHOLDER};
use crate::prefs::UserPreferences;
use crate::site::Site;

pub const UPLOADER_TOKEN: &str = "%(uploader)s";
pub const ALBUM_TOKEN: &str = "%(album)s";
pub const INDEX_TOKEN: &str = "%(album_index)s. ";
pub const TITLE_AND_EXT: &str = "%(title)s.%(ext)s";

const ALBUM_PLACEHOLDER: &str = "album_name";

/// Album and index folders only apply to album-like pages on sites that expose albums.
pub fn album_context(site: Site, metadata: &ResourceMetadata) -> bool {
    site.supports_albums() && (metadata.is_album || metadata.is_profile)
}

/// Trims `path` and makes it end with exactly one `separator`.
pub fn normalize_path(path: &str, separator: &str) -> String {
    let trimmed = path.trim().trim_end_matches(['/', '\\']);
    format!("{trimmed}{separator}")
}

/// Folder placeholders between the save path and the file name, in fixed order.
pub fn extension_segment(prefs: &UserPreferences, album_context: bool, separator: &str) -> String {
    let mut segment = String::new();
    if prefs.uploader_folder {
        segment.push_str(UPLOADER_TOKEN);
        segment.push_str(separator);
    }
    let album_folder = prefs.album_folder && album_context;
    if album_folder {
        segment.push_str(ALBUM_TOKEN);
        segment.push_str(separator);
    }
    // The index follows the album context, not the album folder choice.
    if prefs.track_index && album_context {
        segment.push_str(INDEX_TOKEN);
    }
    segment
}

/// Full output template handed to the downloader.
pub fn output_template(prefs: &UserPreferences, album_context: bool, separator: &str) -> String {
    format!(
        "{}{}{}",
        normalize_path(&prefs.path, separator),
        extension_segment(prefs, album_context, separator),
        TITLE_AND_EXT
    )
}

/// Human-readable preview of where the first file will land, with page
/// metadata filled in where the downloader would substitute placeholders.
pub fn example_path(
    site: Site,
    metadata: &ResourceMetadata,
    prefs: &UserPreferences,
    default_path: &str,
    separator: &str,
) -> String {
    let base = if prefs.path.trim().is_empty() {
        default_path
    } else {
        prefs.path.as_str()
    };
    let show_album = album_context(site, metadata);
    let album_folder = prefs.album_folder && show_album;

    let mut parts: Vec<String> = Vec::new();
    if prefs.uploader_folder {
        parts.push(non_empty_or(&metadata.artist_name, ARTIST_PLACEHOLDER));
    }
    if album_folder {
        parts.push(non_empty_or(&metadata.album_name, ALBUM_PLACEHOLDER));
    }

    let many_files = metadata.is_album || (site.supports_albums() && metadata.is_profile);
    if many_files && show_album {
        let index = if prefs.track_index { "1. " } else { "" };
        parts.push(format!("{index}{TITLE_AND_EXT}"));
    } else {
        parts.push(format!("{}.mp3", non_empty_or(&metadata.track_name, "%(title)s")));
    }

    format!("{}{}", normalize_path(base, separator), parts.join(separator))
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
