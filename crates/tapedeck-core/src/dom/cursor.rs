//! Character cursor shared by the markup reader and the selector parser.

pub(super) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(super) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub(super) fn pos(&self) -> usize {
        self.pos
    }

    pub(super) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(super) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Character after the next one, without consuming anything.
    pub(super) fn peek_second(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    pub(super) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes `s` if the remaining input starts with it.
    pub(super) fn eat(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    pub(super) fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    /// Returns true if at least one whitespace character was skipped.
    pub(super) fn skip_ws(&mut self) -> bool {
        !self.eat_while(char::is_whitespace).is_empty()
    }

    /// Advances past the next occurrence of `pat`; false (and no movement) if absent.
    pub(super) fn skip_past(&mut self, pat: &str) -> bool {
        match self.rest().find(pat) {
            Some(i) => {
                self.pos += i + pat.len();
                true
            }
            None => false,
        }
    }

    /// Moves to an absolute byte offset (must be a char boundary at or after the current position).
    pub(super) fn seek(&mut self, pos: usize) {
        debug_assert!(self.src.is_char_boundary(pos));
        self.pos = pos.min(self.src.len());
    }
}

pub(super) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
