// SPDX-License-Identifier: MIT

//! JSON string unescaping with UTF-16 surrogate reassembly.
//!
//! Operates on the raw span of a string token (quotes excluded).
//! Escape sequences are rewritten, `\uXXXX` surrogate pairs are joined
//! and re-encoded as UTF-8, and the finished output is validated as
//! UTF-8 in one final pass, so raw bytes copied verbatim cannot smuggle
//! malformed sequences through.

use alloc::string::String;

use crate::error::Error;

fn is_high_surrogate(unit: u32) -> bool {
    (0xd800..=0xdbff).contains(&unit)
}

fn is_low_surrogate(unit: u32) -> bool {
    (0xdc00..=0xdfff).contains(&unit)
}

/// Exactly four hex digits after `\u`. Running out of input is
/// `PrematurePart`, a non-hex byte is `InvalidCharacter`.
fn read_4_digits(src: &[u8]) -> Result<u32, Error> {
    if src.len() < 4 {
        return Err(Error::PrematurePart);
    }
    let mut hex: u32 = 0;
    for &b in &src[..4] {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return Err(Error::InvalidCharacter),
        };
        hex = (hex << 4) | u32::from(digit);
    }
    Ok(hex)
}

struct Writer<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Writer<'_> {
    fn push(&mut self, byte: u8) -> Result<(), Error> {
        if self.len >= self.buf.len() {
            return Err(Error::OutOfMemory);
        }
        self.buf[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    fn push_code_point(&mut self, value: u32) -> Result<(), Error> {
        let ch = char::from_u32(value).ok_or(Error::InvalidCharacter)?;
        let mut seq = [0u8; 4];
        for &byte in ch.encode_utf8(&mut seq).as_bytes() {
            self.push(byte)?;
        }
        Ok(())
    }
}

/// Unescape `src` into `buf`, returning the number of bytes written.
///
/// `src` is expected to be the interior of a tokenized JSON string;
/// raw control bytes are rejected regardless. A high surrogate must be
/// immediately followed by a `\uXXXX` low surrogate, and a low
/// surrogate may not appear on its own. [`Error::OutOfMemory`] means
/// `buf` is too small; the worst case output is `src.len()` bytes.
pub fn unescape_into(src: &[u8], buf: &mut [u8]) -> Result<usize, Error> {
    let mut out = Writer { buf, len: 0 };
    let mut pending_high: Option<u32> = None;
    let mut i = 0;

    while i < src.len() {
        let c = src[i];
        i += 1;

        if c <= 0x1f {
            return Err(Error::InvalidCharacter);
        }
        if c != b'\\' {
            if pending_high.is_some() {
                return Err(Error::InvalidCharacter);
            }
            out.push(c)?;
            continue;
        }

        if i >= src.len() {
            return Err(Error::PrematurePart);
        }
        let esc = src[i];
        i += 1;

        if pending_high.is_some() && esc != b'u' {
            return Err(Error::InvalidCharacter);
        }

        match esc {
            b'"' | b'\\' | b'/' => out.push(esc)?,
            b'b' => out.push(0x08)?,
            b'f' => out.push(0x0c)?,
            b'n' => out.push(b'\n')?,
            b'r' => out.push(b'\r')?,
            b't' => out.push(b'\t')?,
            b'u' => {
                let hex = read_4_digits(&src[i..])?;
                i += 4;

                if let Some(high) = pending_high.take() {
                    if !is_low_surrogate(hex) {
                        return Err(Error::InvalidCharacter);
                    }
                    let joined = (((high & 0x3ff) << 10) | (hex & 0x3ff)) + 0x10000;
                    out.push_code_point(joined)?;
                } else if is_high_surrogate(hex) {
                    pending_high = Some(hex);
                } else if is_low_surrogate(hex) {
                    return Err(Error::InvalidCharacter);
                } else {
                    out.push_code_point(hex)?;
                }
            }
            _ => return Err(Error::InvalidCharacter),
        }
    }

    if pending_high.is_some() {
        return Err(Error::InvalidCharacter);
    }

    let written = out.len;
    core::str::from_utf8(&out.buf[..written]).map_err(|_| Error::InvalidCharacter)?;
    Ok(written)
}

/// Unescape `src` into an owned string.
pub fn unescape(src: &[u8]) -> Result<String, Error> {
    let mut buf = alloc::vec![0u8; src.len()];
    let len = unescape_into(src, &mut buf)?;
    buf.truncate(len);
    String::from_utf8(buf).map_err(|_| Error::InvalidCharacter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_copies_through() {
        assert_eq!(unescape(b"hello").unwrap(), "hello");
        assert_eq!(unescape(b"").unwrap(), "");
    }

    #[test]
    fn simple_escapes() {
        assert_eq!(unescape(br#"a\tb"#).unwrap(), "a\tb");
        assert_eq!(unescape(br#"\n\r\b\f"#).unwrap(), "\n\r\u{8}\u{c}");
        assert_eq!(unescape(br#"\"\\\/"#).unwrap(), "\"\\/");
    }

    #[test]
    fn unicode_escape_encodes_utf8() {
        assert_eq!(unescape(br#"\u0041"#).unwrap(), "A");
        assert_eq!(unescape(br#"\u00e9"#).unwrap(), "é");
        assert_eq!(unescape(br#"\u20ac"#).unwrap(), "€");
    }

    #[test]
    fn surrogate_pair_becomes_one_code_point() {
        let out = unescape(br#"\ud83d\ude00"#).unwrap();
        assert_eq!(out, "\u{1f600}");
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn lone_surrogates_are_invalid() {
        assert_eq!(unescape(br#"\ud83d"#), Err(Error::InvalidCharacter));
        assert_eq!(unescape(br#"\ud83dx"#), Err(Error::InvalidCharacter));
        assert_eq!(unescape(br#"\ud83d\n"#), Err(Error::InvalidCharacter));
        assert_eq!(unescape(br#"\ud83dA"#), Err(Error::InvalidCharacter));
        assert_eq!(unescape(br#"\ude00"#), Err(Error::InvalidCharacter));
    }

    #[test]
    fn malformed_unicode_escapes() {
        assert_eq!(unescape(br#"\u12"#), Err(Error::PrematurePart));
        assert_eq!(unescape(br#"\u12G4"#), Err(Error::InvalidCharacter));
        assert_eq!(unescape(br#"tail\"#), Err(Error::PrematurePart));
        assert_eq!(unescape(br#"\x"#), Err(Error::InvalidCharacter));
    }

    #[test]
    fn raw_control_bytes_are_invalid() {
        assert_eq!(unescape(b"a\x01b"), Err(Error::InvalidCharacter));
        assert_eq!(unescape(b"a\x00b"), Err(Error::InvalidCharacter));
    }

    #[test]
    fn copied_bytes_must_be_valid_utf8() {
        // Passes the per-byte copy but fails the final validation pass.
        assert_eq!(unescape(b"a\xffb"), Err(Error::InvalidCharacter));
        assert_eq!(unescape(b"\xc3\x28"), Err(Error::InvalidCharacter));
        // Well-formed multi-byte input survives verbatim.
        assert_eq!(unescape("héllo…".as_bytes()).unwrap(), "héllo…");
    }

    #[test]
    fn buffer_too_small_is_out_of_memory() {
        let mut buf = [0u8; 2];
        assert_eq!(unescape_into(b"abc", &mut buf), Err(Error::OutOfMemory));
        assert_eq!(unescape_into(br#"\u20ac"#, &mut buf), Err(Error::OutOfMemory));
        let mut exact = [0u8; 3];
        assert_eq!(unescape_into(b"abc", &mut exact), Ok(3));
        assert_eq!(&exact, b"abc");
    }

    #[test]
    fn escaped_nul_is_preserved() {
        let out = unescape(br#"a\u0000b"#).unwrap();
        assert_eq!(out.as_bytes(), b"a\x00b");
    }
}
