// SPDX-License-Identifier: MIT

//! Pair indexer: reshapes a flat token array into a navigable tree.
//!
//! The whole tree lives in one contiguous pair arena. Every container
//! pair owns a sub-range of that arena for its children, reserved up
//! front from a shared cursor, so no node ever holds a separate
//! allocation. Object ranges double as fixed-capacity hash buckets
//! keyed by the raw key bytes; array ranges are filled positionally.

use alloc::vec::Vec;

use log::debug;

use crate::error::Error;
use crate::table::{self, string_hash, Keying, Slot, SlotState};
use crate::token::{Span, Token, TokenKind};

/// One node of the indexed tree, doubling as a hash bucket inside its
/// parent's child range.
///
/// `key` is empty for array elements and for the root. `value` covers
/// the node's full raw text, brackets included for containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pair {
    pub kind: TokenKind,
    pub key: Span,
    pub value: Span,
    state: SlotState,
    /// Child range in the arena: `capacity` buckets starting at `start`.
    children_start: usize,
    children_capacity: usize,
    child_count: usize,
}

impl Pair {
    /// Number of children actually present.
    pub fn child_count(&self) -> usize {
        self.child_count
    }

    /// This node's child bucket range within the arena. For arrays the
    /// first [`child_count`](Self::child_count) buckets are the elements
    /// in order; for objects entries sit wherever their key hashed to.
    pub fn buckets<'p>(&self, pairs: &'p [Pair]) -> &'p [Pair] {
        &pairs[self.children_start..self.children_start + self.children_capacity]
    }

    /// Iterate the children present in this node's range, in bucket
    /// order (which for arrays is element order).
    pub fn children<'p>(&self, pairs: &'p [Pair]) -> impl Iterator<Item = &'p Pair> {
        self.buckets(pairs)
            .iter()
            .filter(|pair| pair.state == SlotState::Filled)
    }
}

impl Slot for Pair {
    type Key = Span;
    type Value = Span;

    fn state(&self) -> SlotState {
        self.state
    }

    fn key(&self) -> &Span {
        &self.key
    }

    fn value(&self) -> &Span {
        &self.value
    }

    fn fill(&mut self, key: Span, value: Span) {
        self.key = key;
        self.value = value;
        self.state = SlotState::Filled;
    }

    fn erase(&mut self) {
        self.state = SlotState::Tombstone;
    }
}

/// Keying over spans into one shared JSON text.
pub(crate) struct SpanKeys<'a> {
    pub js: &'a [u8],
}

impl Keying<Span> for SpanKeys<'_> {
    fn hash(&self, key: &Span) -> u64 {
        string_hash(key.bytes(self.js))
    }

    fn eq(&self, a: &Span, b: &Span) -> bool {
        a.bytes(self.js) == b.bytes(self.js)
    }
}

/// Allocation cursor through the shared pair arena.
///
/// A loader can be re-driven over the same text after growing the
/// arena; any failed pass resets the cursor, so the retry re-indexes
/// from scratch.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    pair_next: usize,
}

impl Loader {
    pub fn new() -> Self {
        Loader::default()
    }

    /// Forget all progress; the next [`load`](Self::load) starts fresh.
    pub fn reset(&mut self) {
        self.pair_next = 0;
    }

    /// Arena slots consumed so far.
    pub fn pairs_used(&self) -> usize {
        self.pair_next
    }

    /// Index `tokens` into `pairs`, returning the number of arena slots
    /// used. Slot 0 is always the root node covering the whole input
    /// value.
    ///
    /// [`Error::OutOfMemory`] means the arena is too small; grow it
    /// (keeping the contents irrelevant, the next call re-blanks) and
    /// call again. Any error resets the cursor, so retries re-index
    /// from the first token.
    pub fn load(
        &mut self,
        js: &[u8],
        tokens: &[Token],
        pairs: &mut [Pair],
    ) -> Result<usize, Error> {
        if tokens.is_empty() {
            return Err(Error::PrematurePart);
        }
        if self.pair_next == 0 {
            if pairs.is_empty() {
                return Err(Error::OutOfMemory);
            }
            for pair in pairs.iter_mut() {
                *pair = Pair::default();
            }
            pairs[0].value = tokens[0].span();
            self.pair_next = 1;
        }

        match self.load_value(js, tokens, 0, 0, pairs) {
            Ok(consumed) => {
                debug!(
                    "indexed {} tokens into {} pairs",
                    consumed, self.pair_next
                );
                Ok(self.pair_next)
            }
            Err(err) => {
                self.reset();
                Err(err)
            }
        }
    }

    /// Index the value at `tok_idx` into `pairs[pair_idx]`, reserving
    /// child ranges as needed. Returns the number of tokens consumed by
    /// the value and its subtree.
    fn load_value(
        &mut self,
        js: &[u8],
        tokens: &[Token],
        tok_idx: usize,
        pair_idx: usize,
        pairs: &mut [Pair],
    ) -> Result<usize, Error> {
        let tok = tokens[tok_idx];
        let mut offset = 0;

        match tok.kind {
            TokenKind::String | TokenKind::Primitive => {}
            TokenKind::Object | TokenKind::Array => {
                // One spare bucket keeps the object view below full.
                let bottom = self.pair_next;
                let top = bottom + 1 + tok.size;
                if top > pairs.len() {
                    return Err(Error::OutOfMemory);
                }
                self.pair_next = top;

                pairs[pair_idx].children_start = bottom;
                pairs[pair_idx].children_capacity = top - bottom;
                pairs[pair_idx].child_count = 0;

                if tok.kind == TokenKind::Object {
                    for _ in 0..tok.size {
                        let key_tok = &tokens[tok_idx + 1 + offset];
                        let key = key_tok.span();
                        offset += 1;

                        // A key whose value never arrived (`{"a":}`).
                        if key_tok.size == 0 {
                            return Err(Error::InvalidCharacter);
                        }

                        let value_idx = tok_idx + 1 + offset;
                        let value = tokens[value_idx].span();
                        let assigned = table::assign_slots(
                            &mut pairs[bottom..top],
                            &SpanKeys { js },
                            key,
                            value,
                        )?;
                        if !assigned.replaced {
                            pairs[pair_idx].child_count += 1;
                        }

                        let consumed = self.load_value(
                            js,
                            tokens,
                            value_idx,
                            bottom + assigned.index,
                            pairs,
                        )?;
                        offset += consumed;
                    }
                } else {
                    for i in 0..tok.size {
                        let value_idx = tok_idx + 1 + offset;
                        let element = bottom + i;
                        pairs[element].fill(Span::default(), tokens[value_idx].span());
                        pairs[pair_idx].child_count += 1;

                        let consumed =
                            self.load_value(js, tokens, value_idx, element, pairs)?;
                        offset += consumed;
                    }
                }
            }
            TokenKind::Undefined => return Err(Error::InvalidCharacter),
        }

        pairs[pair_idx].kind = tok.kind;
        Ok(offset + 1)
    }
}

/// One-shot indexing into a caller-supplied arena. Returns the number
/// of arena slots used.
pub fn load_pairs(js: &[u8], tokens: &[Token], pairs: &mut [Pair]) -> Result<usize, Error> {
    Loader::new().load(js, tokens, pairs)
}

/// Index into owned, grown-on-demand arena storage. The returned vector
/// is truncated to the slots actually used.
pub fn load_pairs_auto(js: &[u8], tokens: &[Token]) -> Result<Vec<Pair>, Error> {
    let mut pairs = alloc::vec![Pair::default(); tokens.len().max(1)];
    let mut loader = Loader::new();
    loop {
        match loader.load(js, tokens, &mut pairs) {
            Ok(used) => {
                pairs.truncate(used);
                return Ok(pairs);
            }
            Err(Error::OutOfMemory) => {
                let grown = pairs.len() * 2;
                debug!("pair arena exhausted, growing to {}", grown);
                pairs.resize(grown, Pair::default());
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_auto;
    use test_log::test;

    const SCENARIO: &[u8] =
        br#"{"a":{"url":"x","filename":"y"},"b":{"url":"z","filename":"w"}}"#;

    fn index(js: &[u8]) -> Vec<Pair> {
        let tokens = tokenize_auto(js).unwrap();
        load_pairs_auto(js, &tokens).unwrap()
    }

    fn child<'p>(pairs: &'p [Pair], head: &Pair, key: &[u8], js: &[u8]) -> &'p Pair {
        head.children(pairs)
            .find(|p| p.key.bytes(js) == key)
            .unwrap()
    }

    #[test]
    fn root_spans_the_whole_value() {
        let pairs = index(SCENARIO);
        assert_eq!(pairs[0].kind, TokenKind::Object);
        assert_eq!(pairs[0].value.bytes(SCENARIO), SCENARIO);
        assert_eq!(pairs[0].child_count(), 2);
    }

    #[test]
    fn nested_objects_are_navigable() {
        let pairs = index(SCENARIO);
        let a = child(&pairs, &pairs[0], b"a", SCENARIO);
        assert_eq!(a.kind, TokenKind::Object);
        assert_eq!(a.child_count(), 2);
        let url = child(&pairs, a, b"url", SCENARIO);
        assert_eq!(url.kind, TokenKind::String);
        assert_eq!(url.value.bytes(SCENARIO), b"x");
    }

    #[test]
    fn array_elements_keep_their_order() {
        let js = br#"[10, "mid", [true]]"#;
        let pairs = index(js);
        assert_eq!(pairs[0].kind, TokenKind::Array);
        assert_eq!(pairs[0].child_count(), 3);
        let elems: Vec<&Pair> = pairs[0].children(&pairs).collect();
        assert_eq!(elems[0].value.bytes(js), b"10");
        assert_eq!(elems[1].value.bytes(js), b"mid");
        assert_eq!(elems[2].kind, TokenKind::Array);
        assert_eq!(elems[2].child_count(), 1);
        assert!(elems.iter().all(|p| p.key.is_empty()));
    }

    #[test]
    fn scalar_root_uses_one_pair() {
        let js = b"42";
        let pairs = index(js);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].kind, TokenKind::Primitive);
        assert_eq!(pairs[0].value.bytes(js), b"42");
        assert_eq!(pairs[0].child_count(), 0);
    }

    #[test]
    fn key_without_value_is_invalid() {
        let js = br#"{"a":}"#;
        let tokens = tokenize_auto(js).unwrap();
        let mut pairs = alloc::vec![Pair::default(); 8];
        assert_eq!(
            load_pairs(js, &tokens, &mut pairs),
            Err(Error::InvalidCharacter)
        );
    }

    #[test]
    fn short_arena_reports_out_of_memory_then_succeeds_when_grown() {
        let tokens = tokenize_auto(SCENARIO).unwrap();
        let mut small = alloc::vec![Pair::default(); 4];
        let mut loader = Loader::new();
        assert_eq!(
            loader.load(SCENARIO, &tokens, &mut small),
            Err(Error::OutOfMemory)
        );
        // Failure resets the cursor; the retry re-indexes from scratch.
        assert_eq!(loader.pairs_used(), 0);

        let mut grown = alloc::vec![Pair::default(); 16];
        let used = loader.load(SCENARIO, &tokens, &mut grown).unwrap();
        assert!(used <= 16);
        let a = child(&grown, &grown[0], b"a", SCENARIO);
        assert_eq!(child(&grown, a, b"filename", SCENARIO).value.bytes(SCENARIO), b"y");
    }

    #[test]
    fn duplicate_keys_keep_the_last_value() {
        let js = br#"{"k":1,"k":2}"#;
        let pairs = index(js);
        assert_eq!(pairs[0].child_count(), 1);
        let k = child(&pairs, &pairs[0], b"k", js);
        assert_eq!(k.value.bytes(js), b"2");
    }

    #[test]
    fn undefined_token_is_invalid() {
        let js = b"1";
        let tokens = [Token::default()];
        let mut pairs = [Pair::default(); 2];
        assert_eq!(
            load_pairs(js, &tokens, &mut pairs),
            Err(Error::InvalidCharacter)
        );
    }

    #[test]
    fn empty_token_stream_is_premature() {
        let mut pairs = [Pair::default(); 2];
        assert_eq!(
            load_pairs(b"", &[], &mut pairs),
            Err(Error::PrematurePart)
        );
    }

    #[test]
    fn reset_lets_a_loader_index_a_new_document() {
        let first = br#"{"a":1}"#;
        let second = br#"[1,2]"#;
        let mut loader = Loader::new();
        let mut pairs = alloc::vec![Pair::default(); 8];

        let tokens = tokenize_auto(first).unwrap();
        let used = loader.load(first, &tokens, &mut pairs).unwrap();
        assert_eq!(used, 3);
        assert_eq!(loader.pairs_used(), 3);

        // Without the reset the cursor would keep allocating past the
        // first document's reservations.
        loader.reset();
        let tokens = tokenize_auto(second).unwrap();
        let used = loader.load(second, &tokens, &mut pairs).unwrap();
        assert_eq!(used, 4);
        assert_eq!(pairs[0].kind, TokenKind::Array);
        assert_eq!(pairs[0].child_count(), 2);
    }

    #[test]
    fn pair_count_matches_reservations() {
        // Root slot, then 1+n per container: 1 + 3 + 3 + 3 = 10.
        let tokens = tokenize_auto(SCENARIO).unwrap();
        let pairs = load_pairs_auto(SCENARIO, &tokens).unwrap();
        assert_eq!(pairs.len(), 10);
    }
}
