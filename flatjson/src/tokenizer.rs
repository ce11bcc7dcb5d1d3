// SPDX-License-Identifier: MIT

//! Single-pass JSON tokenizer producing a flat token array.
//!
//! The scanner walks the input left to right exactly once and records one
//! [`Token`] per value, keyed by byte offsets into the source text. No
//! text is copied. Containers are matched through the parent link carried
//! on every token, so closing brackets never re-scan the token array.

use alloc::vec::Vec;

use log::debug;

use crate::error::Error;
use crate::token::{Token, TokenKind};

/// Incremental tokenizer state.
///
/// The parser can be driven repeatedly over the same text: when
/// [`Parser::parse`] fails with [`Error::OutOfMemory`], tokens written so
/// far stay valid and a second call with a larger buffer (holding the
/// same tokens) resumes scanning from the saved cursor.
#[derive(Debug, Clone)]
pub struct Parser {
    /// Offset in the JSON text.
    pos: usize,
    /// Next token slot to allocate.
    tok_next: usize,
    /// Token the next value attaches to: the open container, or an object
    /// key after its `:` was seen.
    tok_super: Option<usize>,
    strict: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// A lenient parser: bare primitive streams, primitives as object
    /// keys and `:`-terminated primitives are all tolerated, as long as
    /// brackets match and strings are well formed.
    pub fn new() -> Self {
        Parser {
            pos: 0,
            tok_next: 0,
            tok_super: None,
            strict: false,
        }
    }

    /// A strict parser: primitives must start with `-`, a digit, `t`,
    /// `f` or `n`, must end at `, ] }` or whitespace, and neither
    /// primitives nor containers may stand in object key position.
    pub fn strict() -> Self {
        Parser {
            strict: true,
            ..Parser::new()
        }
    }

    /// Reset all progress, keeping the mode.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.tok_next = 0;
        self.tok_super = None;
    }

    /// Tokenize `js` into `tokens`. Returns the total token count.
    ///
    /// Errors: [`Error::OutOfMemory`] when `tokens` has no free slot left
    /// (recoverable, see the type docs), [`Error::InvalidCharacter`] on
    /// malformed input, [`Error::PrematurePart`] when the text ends with
    /// a container still open.
    pub fn parse(&mut self, js: &[u8], tokens: &mut [Token]) -> Result<usize, Error> {
        self.scan(js, Some(tokens))
    }

    /// Dry-run mode: advance the cursor and report how many tokens a
    /// parse would produce, without writing any. Container matching is
    /// not tracked, so unclosed containers are not reported here.
    pub fn measure(&mut self, js: &[u8]) -> Result<usize, Error> {
        self.scan(js, None)
    }

    fn scan(&mut self, js: &[u8], mut tokens: Option<&mut [Token]>) -> Result<usize, Error> {
        let mut count = self.tok_next;

        while self.pos < js.len() {
            let c = js[self.pos];
            match c {
                b'{' | b'[' => {
                    count += 1;
                    if let Some(tokens) = tokens.as_deref_mut() {
                        let idx = self.alloc_token(tokens)?;
                        if let Some(sup) = self.tok_super {
                            // A container cannot stand in key position.
                            if self.strict && tokens[sup].kind == TokenKind::Object {
                                return Err(Error::InvalidCharacter);
                            }
                            tokens[sup].size += 1;
                        }
                        tokens[idx] = Token {
                            kind: if c == b'{' {
                                TokenKind::Object
                            } else {
                                TokenKind::Array
                            },
                            start: self.pos,
                            end: self.pos,
                            size: 0,
                            parent: self.tok_super,
                        };
                        self.tok_super = Some(idx);
                    }
                }
                b'}' | b']' => {
                    if let Some(tokens) = tokens.as_deref_mut() {
                        let expected = if c == b'}' {
                            TokenKind::Object
                        } else {
                            TokenKind::Array
                        };
                        let cur = self
                            .open_container(tokens)
                            .ok_or(Error::InvalidCharacter)?;
                        if tokens[cur].kind != expected {
                            return Err(Error::InvalidCharacter);
                        }
                        tokens[cur].end = self.pos + 1;
                        self.tok_super = tokens[cur].parent;
                    }
                }
                b'"' => {
                    self.scan_string(js, tokens.as_deref_mut())?;
                    count += 1;
                    if let Some(tokens) = tokens.as_deref_mut() {
                        if let Some(sup) = self.tok_super {
                            tokens[sup].size += 1;
                        }
                    }
                }
                b'\t' | b'\r' | b'\n' | b' ' => {}
                b':' => {
                    // The key just scanned becomes the attach point for
                    // the upcoming value.
                    self.tok_super = self.tok_next.checked_sub(1);
                }
                b',' => {
                    if let Some(tokens) = tokens.as_deref_mut() {
                        if let Some(sup) = self.tok_super {
                            if !tokens[sup].kind.is_container() {
                                self.tok_super = self.open_container(tokens);
                            }
                        }
                    }
                }
                _ => {
                    if self.strict {
                        if !matches!(c, b'-' | b'0'..=b'9' | b't' | b'f' | b'n') {
                            return Err(Error::InvalidCharacter);
                        }
                        // Primitives may not be object keys, nor follow a
                        // key that already has its value.
                        if let Some(tokens) = tokens.as_deref_mut() {
                            if let Some(sup) = self.tok_super {
                                let t = &tokens[sup];
                                if t.kind == TokenKind::Object
                                    || (t.kind == TokenKind::String && t.size != 0)
                                {
                                    return Err(Error::InvalidCharacter);
                                }
                            }
                        }
                    }
                    self.scan_primitive(js, tokens.as_deref_mut())?;
                    count += 1;
                    if let Some(tokens) = tokens.as_deref_mut() {
                        if let Some(sup) = self.tok_super {
                            tokens[sup].size += 1;
                        }
                    }
                }
            }
            self.pos += 1;
        }

        if let Some(tokens) = tokens.as_deref_mut() {
            if self.open_container(tokens).is_some() {
                return Err(Error::PrematurePart);
            }
        }

        debug!("tokenized {} tokens, {} bytes", count, self.pos);
        Ok(count)
    }

    /// Nearest container on the attach-point's parent chain. Containers
    /// close strictly last-in-first-out, so this is always the innermost
    /// container still open.
    fn open_container(&self, tokens: &[Token]) -> Option<usize> {
        let mut it = self.tok_super;
        while let Some(idx) = it {
            if tokens[idx].kind.is_container() {
                return Some(idx);
            }
            it = tokens[idx].parent;
        }
        None
    }

    fn alloc_token(&mut self, tokens: &[Token]) -> Result<usize, Error> {
        if self.tok_next >= tokens.len() {
            return Err(Error::OutOfMemory);
        }
        let idx = self.tok_next;
        self.tok_next += 1;
        Ok(idx)
    }

    /// Consume a string starting at the opening quote. On any failure the
    /// cursor is restored to the opening quote so a retry re-scans the
    /// whole string.
    fn scan_string(&mut self, js: &[u8], tokens: Option<&mut [Token]>) -> Result<(), Error> {
        let start = self.pos;
        self.pos += 1;

        while self.pos < js.len() {
            let c = js[self.pos];

            if c == b'"' {
                if let Some(tokens) = tokens {
                    let idx = match self.alloc_token(tokens) {
                        Ok(idx) => idx,
                        Err(err) => {
                            self.pos = start;
                            return Err(err);
                        }
                    };
                    tokens[idx] = Token {
                        kind: TokenKind::String,
                        start: start + 1,
                        end: self.pos,
                        size: 0,
                        parent: self.tok_super,
                    };
                }
                return Ok(());
            }

            if c < 0x20 {
                self.pos = start;
                return Err(Error::InvalidCharacter);
            }

            if c == b'\\' && self.pos + 1 < js.len() {
                self.pos += 1;
                match js[self.pos] {
                    b'"' | b'/' | b'\\' | b'b' | b'f' | b'r' | b'n' | b't' => {}
                    b'u' => {
                        self.pos += 1;
                        let mut digits = 0;
                        while digits < 4 && self.pos < js.len() {
                            if !js[self.pos].is_ascii_hexdigit() {
                                self.pos = start;
                                return Err(Error::InvalidCharacter);
                            }
                            self.pos += 1;
                            digits += 1;
                        }
                        self.pos -= 1;
                    }
                    _ => {
                        self.pos = start;
                        return Err(Error::InvalidCharacter);
                    }
                }
            }
            self.pos += 1;
        }

        self.pos = start;
        Err(Error::PrematurePart)
    }

    /// Consume an unquoted primitive. Every byte must be printable ASCII;
    /// the value ends at a structural delimiter or whitespace (or, in
    /// lenient mode, at end of input or a `:`).
    fn scan_primitive(&mut self, js: &[u8], tokens: Option<&mut [Token]>) -> Result<(), Error> {
        let start = self.pos;

        while self.pos < js.len() {
            let c = js[self.pos];
            let ends = match c {
                b'\t' | b'\r' | b'\n' | b' ' | b',' | b']' | b'}' => true,
                b':' => !self.strict,
                _ => false,
            };
            if ends {
                break;
            }
            if !(0x20..0x7f).contains(&c) {
                self.pos = start;
                return Err(Error::InvalidCharacter);
            }
            self.pos += 1;
        }

        if self.strict && self.pos == js.len() {
            // Strict primitives must be closed off by a delimiter.
            self.pos = start;
            return Err(Error::PrematurePart);
        }

        if let Some(tokens) = tokens {
            let idx = match self.alloc_token(tokens) {
                Ok(idx) => idx,
                Err(err) => {
                    self.pos = start;
                    return Err(err);
                }
            };
            tokens[idx] = Token {
                kind: TokenKind::Primitive,
                start,
                end: self.pos,
                size: 0,
                parent: self.tok_super,
            };
        }
        self.pos -= 1;
        Ok(())
    }
}

/// Tokenize `js` into a caller-supplied token buffer.
pub fn tokenize(js: &[u8], tokens: &mut [Token]) -> Result<usize, Error> {
    Parser::new().parse(js, tokens)
}

/// Tokenize `js` into owned, grown-on-demand token storage.
///
/// Starts with a single slot and doubles on every [`Error::OutOfMemory`],
/// re-scanning from the start of the text each round. The returned vector
/// is truncated to the produced token count.
pub fn tokenize_auto(js: &[u8]) -> Result<Vec<Token>, Error> {
    let mut tokens = alloc::vec![Token::default(); 1];
    loop {
        let mut parser = Parser::new();
        match parser.parse(js, &mut tokens) {
            Ok(count) => {
                tokens.truncate(count);
                return Ok(tokens);
            }
            Err(Error::OutOfMemory) => {
                let grown = tokens.len() * 2;
                debug!("token storage exhausted, growing to {}", grown);
                tokens.resize(grown, Token::default());
            }
            Err(err) => return Err(err),
        }
    }
}
