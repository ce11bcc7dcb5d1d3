// SPDX-License-Identifier: MIT

//! Key and path lookup over an indexed pair tree.

use crate::pair::Pair;
use crate::table::{find_slot_by, string_hash};
use crate::token::TokenKind;

/// Look up an immediate child of `head`: by raw key bytes for objects,
/// by decimal index for arrays. Any other node kind has no children to
/// find.
pub fn find<'p>(pairs: &'p [Pair], head: &Pair, js: &[u8], key: &[u8]) -> Option<&'p Pair> {
    match head.kind {
        TokenKind::Object => {
            let buckets = head.buckets(pairs);
            let idx = find_slot_by(buckets, string_hash(key), |pair| {
                pair.key.bytes(js) == key
            })?;
            Some(&buckets[idx])
        }
        TokenKind::Array => {
            let idx = parse_index(key)?;
            (idx < head.child_count()).then(|| &head.buckets(pairs)[idx])
        }
        _ => None,
    }
}

/// Resolve a multi-segment path by repeated [`find`], missing on the
/// first segment that does not resolve.
pub fn find_path<'p>(
    pairs: &'p [Pair],
    head: &'p Pair,
    js: &[u8],
    path: &[&[u8]],
) -> Option<&'p Pair> {
    let mut iter = head;
    let mut found = None;
    for key in path {
        found = find(pairs, iter, js, key);
        iter = found?;
    }
    found
}

/// Array subscripts parse like `strtol`: leading decimal digits, the
/// rest of the key ignored. A key with no leading digit does not
/// resolve.
fn parse_index(key: &[u8]) -> Option<usize> {
    let digits = key.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let mut idx: usize = 0;
    for &b in &key[..digits] {
        idx = idx.checked_mul(10)?.checked_add(usize::from(b - b'0'))?;
    }
    Some(idx)
}
