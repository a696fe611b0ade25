//! Query-string encoding for the downloader URI.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped, as
/// `encodeURIComponent` does; the downloader's handler decodes with that rule.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub(super) fn component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Base64 of the UTF-8 bytes, then component-encoded (`+`, `/`, `=` escaped).
pub(super) fn base64_component(value: &str) -> String {
    component(&STANDARD.encode(value.as_bytes()))
}

/// Ordered `key=value` pairs joined after `<scheme>:?`.
#[derive(Debug, Default)]
pub(super) struct QueryBuilder {
    pairs: Vec<String>,
}

impl QueryBuilder {
    pub(super) fn push(&mut self, key: &str, value: &str) {
        self.pairs.push(format!("{key}={}", component(value)));
    }

    pub(super) fn push_encoded(&mut self, key: &str, encoded: String) {
        self.pairs.push(format!("{key}={encoded}"));
    }

    pub(super) fn flag(&mut self, key: &str, on: bool) {
        if on {
            self.pairs.push(format!("{key}=true"));
        }
    }

    pub(super) fn finish(self, scheme: &str) -> String {
        format!("{scheme}:?{}", self.pairs.join("&"))
    }
}
