//! Selector subset used by the per-site rule tables.
//!
//! Supported: selector lists (`a, b`), descendant chains (`a b`), and compound
//! selectors built from a tag or `*`, `#id`, `.class`, `[attr]`,
//! `[attr=v]`, `[attr^=v]`, `[attr*=v]`, `[attr$=v]` and `:not(<compound>)`.

use super::cursor::{is_ident_char, Cursor};
use super::{Document, NodeId};

#[derive(Debug, thiserror::Error)]
#[error("invalid selector `{selector}` at offset {offset}: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub offset: usize,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Prefix,
    Contains,
    Suffix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Id(String),
    Class(String),
    Attr {
        name: String,
        value: Option<(AttrOp, String)>,
    },
    Not(Box<Compound>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    conditions: Vec<Condition>,
}

/// Compounds left to right, joined by descendant combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chain(Vec<Compound>);

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    chains: Vec<Chain>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut p = Parser {
            cur: Cursor::new(input),
            source: input,
        };
        let mut chains = Vec::new();
        loop {
            p.cur.skip_ws();
            chains.push(p.chain()?);
            p.cur.skip_ws();
            if p.cur.is_eof() {
                break;
            }
            if !p.cur.eat(",") {
                return Err(p.error("expected `,` or end of selector"));
            }
        }
        Ok(Self {
            source: input.to_string(),
            chains,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the element `id` matches any selector in the list.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        doc.is_element(id) && self.chains.iter().any(|c| c.matches(doc, id))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl Chain {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some((last, rest)) = self.0.split_last() else {
            return false;
        };
        if !last.matches(doc, id) {
            return false;
        }
        // Descendant-only chains can be matched greedily against the nearest ancestors.
        let mut ancestors = doc.ancestors(id);
        rest.iter()
            .rev()
            .all(|compound| ancestors.any(|a| compound.matches(doc, a)))
    }
}

impl Compound {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(tag) = doc.tag_name(id) else {
            return false;
        };
        if let Some(want) = &self.tag {
            if !want.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.conditions.iter().all(|c| c.matches(doc, id))
    }
}

impl Condition {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        match self {
            Condition::Id(want) => doc.attribute(id, "id") == Some(want.as_str()),
            Condition::Class(class) => doc.has_class(id, class),
            Condition::Attr { name, value } => {
                let Some(actual) = doc.attribute(id, name) else {
                    return false;
                };
                match value {
                    None => true,
                    Some((AttrOp::Equals, v)) => actual == v.as_str(),
                    // Empty operands never match for substring operators.
                    Some((_, v)) if v.is_empty() => false,
                    Some((AttrOp::Prefix, v)) => actual.starts_with(v.as_str()),
                    Some((AttrOp::Contains, v)) => actual.contains(v.as_str()),
                    Some((AttrOp::Suffix, v)) => actual.ends_with(v.as_str()),
                }
            }
            Condition::Not(inner) => !inner.matches(doc, id),
        }
    }
}

struct Parser<'a> {
    cur: Cursor<'a>,
    source: &'a str,
}

impl Parser<'_> {
    fn error(&self, reason: &'static str) -> SelectorError {
        SelectorError {
            selector: self.source.to_string(),
            offset: self.cur.pos(),
            reason,
        }
    }

    fn chain(&mut self) -> Result<Chain, SelectorError> {
        let mut compounds = vec![self.compound()?];
        loop {
            let had_ws = self.cur.skip_ws();
            match self.cur.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') | Some('+') | Some('~') => {
                    return Err(self.error("only descendant combinators are supported"))
                }
                Some(_) if had_ws => compounds.push(self.compound()?),
                Some(_) => return Err(self.error("unexpected character")),
            }
        }
        Ok(Chain(compounds))
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let name = self.cur.eat_while(is_ident_char);
        if name.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(name.to_string())
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut tag = None;
        let universal = self.cur.eat("*");
        if !universal && self.cur.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            tag = Some(self.ident()?.to_ascii_lowercase());
        }
        let mut conditions = Vec::new();
        loop {
            match self.cur.peek() {
                Some('.') => {
                    self.cur.bump();
                    conditions.push(Condition::Class(self.ident()?));
                }
                Some('#') => {
                    self.cur.bump();
                    conditions.push(Condition::Id(self.ident()?));
                }
                Some('[') => {
                    self.cur.bump();
                    conditions.push(self.attribute()?);
                }
                Some(':') => {
                    self.cur.bump();
                    if !self.cur.eat("not(") {
                        return Err(self.error("only :not() is supported"));
                    }
                    self.cur.skip_ws();
                    let inner = self.compound()?;
                    self.cur.skip_ws();
                    if !self.cur.eat(")") {
                        return Err(self.error("expected `)`"));
                    }
                    conditions.push(Condition::Not(Box::new(inner)));
                }
                _ => break,
            }
        }
        if !universal && tag.is_none() && conditions.is_empty() {
            return Err(self.error("empty compound selector"));
        }
        Ok(Compound { tag, conditions })
    }

    fn attribute(&mut self) -> Result<Condition, SelectorError> {
        self.cur.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.cur.skip_ws();
        if self.cur.eat("]") {
            return Ok(Condition::Attr { name, value: None });
        }
        let op = if self.cur.eat("=") {
            AttrOp::Equals
        } else if self.cur.eat("^=") {
            AttrOp::Prefix
        } else if self.cur.eat("*=") {
            AttrOp::Contains
        } else if self.cur.eat("$=") {
            AttrOp::Suffix
        } else {
            return Err(self.error("unsupported attribute operator"));
        };
        self.cur.skip_ws();
        let value = match self.cur.peek() {
            Some(q @ ('"' | '\'')) => {
                self.cur.bump();
                let v = self.cur.eat_while(|c| c != q).to_string();
                if self.cur.bump() != Some(q) {
                    return Err(self.error("unterminated string"));
                }
                v
            }
            _ => self.ident()?,
        };
        self.cur.skip_ws();
        if !self.cur.eat("]") {
            return Err(self.error("expected `]`"));
        }
        Ok(Condition::Attr {
            name,
            value: Some((op, value)),
        })
    }
}
