// SPDX-License-Identifier: MIT

#![cfg_attr(not(test), no_std)]

//! Flat-token JSON indexing for resource-constrained callers.
//!
//! The crate splits JSON handling into independently usable stages:
//! [`tokenize`] scans text into a flat [`Token`] array without copying
//! a byte, [`load_pairs`] reshapes those tokens into a navigable
//! [`Pair`] tree backed by a single arena, [`find_path`] resolves keys
//! and array indices against that tree, and [`unescape`] materializes
//! string values. Every stage works against caller-supplied buffers;
//! the `_auto` variants own and grow their storage instead.

extern crate alloc;

mod error;
pub use error::Error;

mod token;
pub use token::{Span, Token, TokenKind};

mod tokenizer;
pub use tokenizer::{tokenize, tokenize_auto, Parser};

mod table;
pub use table::{
    assign_slots, contains_slots, delete_slots, find_slot_by, lookup_slots, string_hash,
    Assigned, Entry, HashTable, Keying, RawKeys, Slot, SlotState, INITIAL_CAPACITY,
};

mod pair;
pub use pair::{load_pairs, load_pairs_auto, Loader, Pair};

mod find;
pub use find::{find, find_path};

mod unescape;
pub use unescape::{unescape, unescape_into};
