// SPDX-License-Identifier: MIT

/// Errors reported by the tokenizer, indexer, lookup and unescape routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Token or pair storage was exhausted. Recoverable: retry with a
    /// larger buffer, or use one of the `*_auto` entry points.
    OutOfMemory,
    /// Malformed syntax, escape sequence or encoding. Terminal for the
    /// current parse.
    InvalidCharacter,
    /// The input ended before the value was complete; more bytes were
    /// expected.
    PrematurePart,
    /// A fixed-capacity hash table view had no free slot left.
    CapacityExceeded,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::OutOfMemory => write!(f, "not enough storage provided"),
            Error::InvalidCharacter => write!(f, "invalid character in input"),
            Error::PrematurePart => write!(f, "input ended before value was complete"),
            Error::CapacityExceeded => write!(f, "fixed-capacity table is full"),
        }
    }
}

impl core::error::Error for Error {}
