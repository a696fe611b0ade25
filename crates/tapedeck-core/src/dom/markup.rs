//! Forgiving HTML reader for saved page snapshots and fragments.
//!
//! Not a conforming HTML5 parser: it builds the element/text tree the rule
//! tables need and ignores everything else (doctype, comments, script and
//! style bodies). Unmatched end tags are dropped; elements still open at end
//! of input are closed implicitly.

use super::cursor::{is_ident_char, Cursor};
use super::{Document, NodeId};

#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("unterminated tag starting at offset {offset}")]
    UnterminatedTag { offset: usize },
    #[error("unterminated comment starting at offset {offset}")]
    UnterminatedComment { offset: usize },
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parses `input` into children of `parent`; returns the top-level nodes created.
pub(super) fn parse_into(
    doc: &mut Document,
    parent: NodeId,
    input: &str,
) -> Result<Vec<NodeId>, MarkupError> {
    let mut cur = Cursor::new(input);
    let mut open: Vec<NodeId> = vec![parent];
    let mut top_level = Vec::new();

    while !cur.is_eof() {
        let start = cur.pos();
        if cur.eat("<!--") {
            if !cur.skip_past("-->") {
                return Err(MarkupError::UnterminatedComment { offset: start });
            }
        } else if cur.rest().starts_with("<!") || cur.rest().starts_with("<?") {
            if !cur.skip_past(">") {
                return Err(MarkupError::UnterminatedTag { offset: start });
            }
        } else if cur.rest().starts_with("</") {
            cur.eat("</");
            let name = cur.eat_while(is_ident_char).to_ascii_lowercase();
            if !cur.skip_past(">") {
                return Err(MarkupError::UnterminatedTag { offset: start });
            }
            close_element(doc, &mut open, &name);
        } else if cur.peek() == Some('<') && cur.peek_second().is_some_and(|c| c.is_ascii_alphabetic()) {
            cur.bump();
            let tag = start_tag(doc, &mut cur, start)?;
            let element = tag.id;
            append(doc, &open, &mut top_level, element);
            let name = doc.tag_name(element).unwrap_or_default().to_string();
            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !tag.self_closing {
                skip_raw_text(&mut cur, &name);
            } else if !tag.self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
                open.push(element);
            }
        } else {
            let text = read_text(&mut cur);
            if !text.trim().is_empty() {
                let node = doc.create_text(&decode_entities(&text));
                append(doc, &open, &mut top_level, node);
            }
        }
    }

    Ok(top_level)
}

struct StartTag {
    id: NodeId,
    self_closing: bool,
}

fn start_tag(doc: &mut Document, cur: &mut Cursor<'_>, start: usize) -> Result<StartTag, MarkupError> {
    let name = cur.eat_while(|c| is_ident_char(c) || c == ':');
    let element = doc.create_element(name);
    loop {
        cur.skip_ws();
        if cur.eat("/>") {
            return Ok(StartTag {
                id: element,
                self_closing: true,
            });
        }
        if cur.eat(">") {
            return Ok(StartTag {
                id: element,
                self_closing: false,
            });
        }
        let attr = cur.eat_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\''));
        if attr.is_empty() {
            // Stray character such as a lone `/` or quote; skip it.
            if cur.bump().is_none() {
                return Err(MarkupError::UnterminatedTag { offset: start });
            }
            continue;
        }
        cur.skip_ws();
        let value = if cur.eat("=") {
            cur.skip_ws();
            match cur.peek() {
                Some(q @ ('"' | '\'')) => {
                    cur.bump();
                    let v = cur.eat_while(|c| c != q).to_string();
                    if cur.bump().is_none() {
                        return Err(MarkupError::UnterminatedTag { offset: start });
                    }
                    v
                }
                _ => cur.eat_while(|c| !c.is_whitespace() && c != '>').to_string(),
            }
        } else {
            String::new()
        };
        doc.set_attribute(element, attr, &decode_entities(&value));
    }
}

fn append(doc: &mut Document, open: &[NodeId], top_level: &mut Vec<NodeId>, node: NodeId) {
    let parent = open[open.len() - 1];
    doc.append_child(parent, node);
    if open.len() == 1 {
        top_level.push(node);
    }
}

fn close_element(doc: &Document, open: &mut Vec<NodeId>, name: &str) {
    // Index 0 is the insertion parent and is never popped.
    if let Some(pos) = open
        .iter()
        .skip(1)
        .rposition(|id| doc.tag_name(*id) == Some(name))
    {
        open.truncate(pos + 1);
    }
}

fn skip_raw_text(cur: &mut Cursor<'_>, name: &str) {
    let needle = format!("</{name}");
    let lowered = cur.rest().to_ascii_lowercase();
    match lowered.find(&needle) {
        Some(i) => {
            let end = cur.pos() + i;
            cur.seek(end);
            cur.skip_past(">");
        }
        None => {
            let end = cur.pos() + cur.rest().len();
            cur.seek(end);
        }
    }
}

fn read_text(cur: &mut Cursor<'_>) -> String {
    let mut text = String::new();
    loop {
        text.push_str(cur.eat_while(|c| c != '<'));
        let starts_markup = match cur.peek_second() {
            Some(c) => c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'),
            None => false,
        };
        if cur.is_eof() || starts_markup {
            return text;
        }
        // A `<` that cannot open a tag is literal text.
        if let Some(c) = cur.bump() {
            text.push(c);
        }
    }
}

/// Decodes the character references that show up in page snapshots.
pub(super) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => numeric_reference(entity),
            }?;
            Some((c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn numeric_reference(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Selector;
    use url::Url;

    fn doc(markup: &str) -> Document {
        Document::parse(markup, Url::parse("https://example.com/").unwrap()).unwrap()
    }

    fn first(d: &Document, s: &str) -> NodeId {
        d.query(d.root(), &Selector::parse(s).unwrap()).unwrap()
    }

    #[test]
    fn reads_attributes_in_all_styles() {
        let d = doc(r#"<input type=checkbox checked data-x='1' class="a b">"#);
        let input = first(&d, "input");
        assert_eq!(d.attribute(input, "type"), Some("checkbox"));
        assert_eq!(d.attribute(input, "checked"), Some(""));
        assert_eq!(d.attribute(input, "data-x"), Some("1"));
        assert!(d.has_class(input, "b"));
    }

    #[test]
    fn void_and_self_closing_elements_do_not_nest() {
        let d = doc(r#"<div><meta property="og:title" content="x"><br/><span>t</span></div>"#);
        let span = first(&d, "span");
        let div = first(&d, "div");
        assert_eq!(d.parent(span), Some(div));
    }

    #[test]
    fn skips_doctype_comments_and_scripts() {
        let d = doc(
            "<!DOCTYPE html><html><!-- <p>hidden</p> --><body><script>if (a < b) {}</script><p>shown</p></body></html>",
        );
        let body = first(&d, "body");
        assert_eq!(d.text_content(body), "shown");
        assert_eq!(d.query_all(d.root(), &Selector::parse("p").unwrap()).len(), 1);
    }

    #[test]
    fn unmatched_end_tags_are_ignored_and_open_tags_closed() {
        let d = doc("<div><p>one</span></p><p>two");
        let div = first(&d, "div");
        assert_eq!(d.text_content(div), "onetwo");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry &#39;live&#x21;&#39;"), "Tom & Jerry 'live!'");
        assert_eq!(decode_entities("a & b"), "a & b");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn literal_less_than_in_text() {
        let d = doc("<p>1 < 2</p>");
        assert_eq!(d.text_content(first(&d, "p")), "1 < 2");
    }

    #[test]
    fn unterminated_tag_is_an_error() {
        let err = Document::parse("<div class=\"x", Url::parse("https://example.com/").unwrap());
        assert!(matches!(err, Err(MarkupError::UnterminatedTag { offset: 0 })));
    }

    #[test]
    fn fragments_report_top_level_nodes() {
        let mut d = doc("<main></main>");
        let main = first(&d, "main");
        let added = d.append_markup(main, "<li>a</li><li>b</li>").unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(d.children(main), added.as_slice());
    }
}
