//! Shared helpers: saved page fixtures and scripted host collaborators.

#![allow(dead_code)]

use std::path::PathBuf;

use tapedeck_core::dom::{Document, NodeId, Selector};
use tapedeck_core::flow::{DialogContext, Navigator, OptionsDialog};
use tapedeck_core::prefs::UserPreferences;
use url::Url;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Loads `name` as if it had been served from `location`.
pub fn load_page(name: &str, location: &str) -> Document {
    let markup = std::fs::read_to_string(fixture_path(name)).expect("read fixture");
    Document::parse(&markup, Url::parse(location).unwrap()).expect("parse fixture")
}

pub fn select(doc: &Document, selector: &str) -> Vec<NodeId> {
    doc.query_all(doc.root(), &Selector::parse(selector).unwrap())
}

/// Query string value of `key` in a `scheme:?k=v&...` URI, still encoded.
pub fn raw_param<'a>(uri: &'a str, key: &str) -> Option<&'a str> {
    let (_, query) = uri.split_once(":?")?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

pub fn param_keys(uri: &str) -> Vec<String> {
    let (_, query) = uri.split_once(":?").unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, _)| k.to_string())
        .collect()
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub uris: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, uri: &str) {
        self.uris.push(uri.to_string());
    }
}

/// Confirms the prefilled preferences with a fixed set of changes.
pub struct ConfirmingDialog {
    pub answer: Box<dyn Fn(&UserPreferences) -> UserPreferences>,
    pub contexts: Vec<DialogContext>,
}

impl ConfirmingDialog {
    pub fn prefill() -> Self {
        Self::with(|p| p.clone())
    }

    pub fn with(answer: impl Fn(&UserPreferences) -> UserPreferences + 'static) -> Self {
        Self {
            answer: Box::new(answer),
            contexts: Vec::new(),
        }
    }
}

impl OptionsDialog for ConfirmingDialog {
    fn collect(&mut self, context: &DialogContext) -> Option<UserPreferences> {
        self.contexts.push(context.clone());
        Some((self.answer)(&context.prefill))
    }
}
