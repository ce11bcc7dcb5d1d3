// SPDX-License-Identifier: MIT

/// JSON type identifier for a scanned token.
///
/// `Undefined` is the pre-fill state of caller-supplied token storage and
/// is never produced by a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenKind {
    #[default]
    Undefined,
    /// `{ ... }`
    Object,
    /// `[ ... ]`
    Array,
    /// A quoted string; the token span excludes the quotes.
    String,
    /// Number, boolean or null.
    Primitive,
}

impl TokenKind {
    /// Whether this kind may own child tokens.
    pub fn is_container(&self) -> bool {
        matches!(self, TokenKind::Object | TokenKind::Array)
    }
}

/// A scanned lexical unit: byte boundaries into the source text plus the
/// number of immediate children.
///
/// Tokens are produced in document order (pre-order for containers), so a
/// container token always precedes its children. `size` counts immediate
/// children only; strings and primitives have 0. `parent` links every
/// token back to the container or object key it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Token {
    pub kind: TokenKind,
    /// Start offset in the source text.
    pub start: usize,
    /// One past the last byte of the token in the source text.
    pub end: usize,
    /// Number of immediate children.
    pub size: usize,
    /// Index of the enclosing container or key token, if any.
    pub parent: Option<usize>,
}

impl Token {
    /// The token's byte range as a `Span`.
    pub fn span(&self) -> Span {
        Span {
            pos: self.start,
            len: self.end.saturating_sub(self.start),
        }
    }
}

/// A byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub pos: usize,
    pub len: usize,
}

impl Span {
    pub fn new(pos: usize, len: usize) -> Self {
        Span { pos, len }
    }

    /// Resolve the span against the source text it was produced from.
    /// Returns an empty slice if the span does not fit `js`, which cannot
    /// happen for spans handed out by the tokenizer or indexer.
    pub fn bytes<'a>(&self, js: &'a [u8]) -> &'a [u8] {
        js.get(self.pos..self.pos + self.len).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
