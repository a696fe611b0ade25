//! Tests for the request command's dialog flags.

use tapedeck_core::prefs::QualityPreset;

use super::{parse, parse_err};
use crate::cli::CliCommand;

const BASE: [&str; 5] = ["tapedeck", "request", "p.html", "--url", "https://x.bandcamp.com/album/y"];

fn with(extra: &[&'static str]) -> Vec<&'static str> {
    BASE.iter().chain(extra).copied().collect()
}

#[test]
fn cli_parse_request_defaults() {
    match parse(&BASE) {
        CliCommand::Request {
            element,
            options,
            open,
            ..
        } => {
            assert!(element.is_none());
            assert!(options.path.is_none());
            assert!(options.quality.is_none());
            assert!(options.use_cookies.is_none());
            assert!(!open);
        }
        _ => panic!("expected Request"),
    }
}

#[test]
fn cli_parse_request_options() {
    let args = with(&[
        "--element",
        ".buyItem",
        "--path",
        "D:\\Music",
        "--quality",
        "MP3",
        "--custom",
        "--no-playlist",
        "--track-index",
        "true",
        "--use-cookies",
        "false",
        "--open",
    ]);
    match parse(&args) {
        CliCommand::Request {
            element,
            options,
            open,
            ..
        } => {
            assert_eq!(element.as_deref(), Some(".buyItem"));
            assert_eq!(options.path.as_deref(), Some("D:\\Music"));
            assert_eq!(options.quality, Some(QualityPreset::Mp3));
            assert_eq!(options.custom.as_deref(), Some("--no-playlist"));
            assert_eq!(options.track_index, Some(true));
            assert_eq!(options.use_cookies, Some(false));
            assert!(options.album_folder.is_none());
            assert!(open);
        }
        _ => panic!("expected Request"),
    }
}

#[test]
fn cli_parse_request_rejects_unknown_quality() {
    let err = parse_err(&with(&["--quality", "flac"]));
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn cli_parse_request_rejects_non_bool_option() {
    let err = parse_err(&with(&["--embed-thumbnail", "maybe"]));
    assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
}
