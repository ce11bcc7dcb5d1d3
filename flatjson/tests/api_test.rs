// SPDX-License-Identifier: MIT

//! End-to-end exercises of the public API: tokenize, index, look up,
//! unescape.

use flatjson::{
    find, find_path, load_pairs, load_pairs_auto, tokenize, tokenize_auto, unescape, Error,
    Pair, Parser, Token, TokenKind,
};

const CONFIG: &[u8] = br#"{"a":{"url":"x","filename":"y"},"b":{"url":"z","filename":"w"}}"#;

#[test]
fn token_and_pair_counts_match_the_document_shape() {
    // 1 root object + 2 * (key + object + 2 * (key + string)).
    let tokens = tokenize_auto(CONFIG).unwrap();
    assert_eq!(tokens.len(), 13);

    // Arena: root slot + (1+2) per object.
    let pairs = load_pairs_auto(CONFIG, &tokens).unwrap();
    assert_eq!(pairs.len(), 10);
    assert_eq!(pairs[0].child_count(), 2);
}

#[test]
fn paths_resolve_to_the_expected_value_spans() {
    let tokens = tokenize_auto(CONFIG).unwrap();
    let pairs = load_pairs_auto(CONFIG, &tokens).unwrap();

    let url = find_path(&pairs, &pairs[0], CONFIG, &[b"a".as_slice(), b"url".as_slice()])
        .unwrap();
    assert_eq!(url.value.bytes(CONFIG), b"x");

    let name = find_path(
        &pairs,
        &pairs[0],
        CONFIG,
        &[b"b".as_slice(), b"filename".as_slice()],
    )
    .unwrap();
    assert_eq!(name.value.bytes(CONFIG), b"w");
}

#[test]
fn lookups_are_idempotent() {
    let tokens = tokenize_auto(CONFIG).unwrap();
    let pairs = load_pairs_auto(CONFIG, &tokens).unwrap();

    let first = find(&pairs, &pairs[0], CONFIG, b"a").unwrap();
    for _ in 0..3 {
        let again = find(&pairs, &pairs[0], CONFIG, b"a").unwrap();
        assert_eq!(again.value.bytes(CONFIG), first.value.bytes(CONFIG));
        assert_eq!(again.child_count(), first.child_count());
    }
}

#[test]
fn value_spans_point_into_the_original_text() {
    // No copies anywhere: every span resolves against the input buffer.
    let tokens = tokenize_auto(CONFIG).unwrap();
    let pairs = load_pairs_auto(CONFIG, &tokens).unwrap();

    let a = find(&pairs, &pairs[0], CONFIG, b"a").unwrap();
    let raw = a.value.bytes(CONFIG);
    assert_eq!(raw, br#"{"url":"x","filename":"y"}"#);
    let b = find(&pairs, &pairs[0], CONFIG, b"b").unwrap();
    assert_eq!(b.value.bytes(CONFIG), &CONFIG[36..62]);
}

#[test]
fn key_without_value_fails_indexing() {
    let js = br#"{"a":}"#;
    let tokens = tokenize_auto(js).unwrap();
    let mut pairs = [Pair::default(); 8];
    assert_eq!(load_pairs(js, &tokens, &mut pairs), Err(Error::InvalidCharacter));
}

#[test]
fn truncated_document_is_premature() {
    assert_eq!(tokenize_auto(br#"{"a":1"#), Err(Error::PrematurePart));
}

#[test]
fn small_token_buffer_recovers_with_a_larger_one() {
    let js = br#"[1,2]"#;
    let mut one = [Token::default(); 1];
    assert_eq!(tokenize(js, &mut one), Err(Error::OutOfMemory));

    let mut ten = [Token::default(); 10];
    let count = tokenize(js, &mut ten).unwrap();
    assert_eq!(count, 3);
    assert_eq!(ten[0].kind, TokenKind::Array);
}

#[test]
fn interrupted_parser_resumes_without_rescanning_written_tokens() {
    let js = br#"{"k":[true,false]}"#;
    let mut parser = Parser::new();
    let mut tokens = [Token::default(); 2];
    assert_eq!(parser.parse(js, &mut tokens), Err(Error::OutOfMemory));

    let mut full = [Token::default(); 8];
    full[..2].copy_from_slice(&tokens);
    let count = parser.parse(js, &mut full).unwrap();
    assert_eq!(count, 5);

    let pairs = load_pairs_auto(js, &full[..count]).unwrap();
    let second = find_path(&pairs, &pairs[0], js, &[b"k".as_slice(), b"1".as_slice()])
        .unwrap();
    assert_eq!(second.value.bytes(js), b"false");
}

#[test]
fn unescape_round_trips_through_a_tokenized_string() {
    let js = br#"{"msg":"line\nbreak \u00e9 \ud83d\ude00"}"#;
    let tokens = tokenize_auto(js).unwrap();
    let pairs = load_pairs_auto(js, &tokens).unwrap();
    let msg = find(&pairs, &pairs[0], js, b"msg").unwrap();
    assert_eq!(
        unescape(msg.value.bytes(js)).unwrap(),
        "line\nbreak \u{e9} \u{1f600}"
    );
}

#[test]
fn unescape_acceptance_cases() {
    assert_eq!(unescape(br#"\u0041"#).unwrap(), "A");
    assert_eq!(
        unescape(br#"\ud83d\ude00"#).unwrap().as_bytes(),
        "\u{1f600}".as_bytes()
    );
    assert_eq!(unescape(br#"\ud83d"#), Err(Error::InvalidCharacter));
    assert_eq!(unescape(br#"\t"#).unwrap(), "\t");
}

#[test]
fn deeply_nested_arrays_index_cleanly() {
    let js = b"[[[[[[[[1]]]]]]]]";
    let tokens = tokenize_auto(js).unwrap();
    assert_eq!(tokens.len(), 9);
    let pairs = load_pairs_auto(js, &tokens).unwrap();

    let mut node = &pairs[0];
    for _ in 0..7 {
        node = find(&pairs, node, js, b"0").unwrap();
        assert_eq!(node.kind, TokenKind::Array);
    }
    let leaf = find(&pairs, node, js, b"0").unwrap();
    assert_eq!(leaf.value.bytes(js), b"1");
}
