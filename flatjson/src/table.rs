// SPDX-License-Identifier: MIT

//! Generic open-addressing hash table.
//!
//! Collisions are resolved with linear probing, wrapping at capacity.
//! Deletion leaves a tombstone so probe chains for other keys stay
//! valid. The table comes in two flavors: [`HashTable`] owns its bucket
//! storage and grows by rehashing, while the slice-level functions
//! ([`assign_slots`], [`lookup_slots`], ...) operate over any
//! caller-supplied fixed-capacity bucket slice and never allocate.
//! Hashing and key comparison are injected through the [`Keying`]
//! strategy, and bucket storage through the [`Slot`] trait, so domain
//! records can serve as buckets directly.

use alloc::vec::Vec;

use log::debug;

use crate::error::Error;

/// Default capacity of heap-owned tables.
pub const INITIAL_CAPACITY: usize = 10;

/// Heap-owned tables grow once this percentage of buckets is occupied.
const LOAD_THRESHOLD_PERCENT: usize = 80;

/// Growth multiplier as a ratio: x1.3, rounded down.
const GROWTH_NUMERATOR: usize = 13;
const GROWTH_DENOMINATOR: usize = 10;

/// Fill state of a single bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Unfilled,
    Filled,
    /// Deleted, but kept occupied to preserve probe chains.
    Tombstone,
}

/// Storage interface of a single bucket.
pub trait Slot {
    type Key;
    type Value;

    fn state(&self) -> SlotState;
    fn key(&self) -> &Self::Key;
    fn value(&self) -> &Self::Value;
    /// Store a key/value and mark the bucket filled.
    fn fill(&mut self, key: Self::Key, value: Self::Value);
    /// Mark the bucket deleted, leaving a tombstone.
    fn erase(&mut self);
}

/// Injectable hash and comparison strategy for keys of type `K`.
pub trait Keying<K> {
    fn hash(&self, key: &K) -> u64;
    fn eq(&self, a: &K, b: &K) -> bool;
}

/// Polynomial rolling hash used by all byte-string keyings:
/// seed 5031, `h = h * 3 + byte`.
pub fn string_hash(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 5031;
    for &b in bytes {
        hash = hash.wrapping_mul(3).wrapping_add(u64::from(b));
    }
    hash
}

/// Strategy for plain byte-slice keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawKeys;

impl Keying<&[u8]> for RawKeys {
    fn hash(&self, key: &&[u8]) -> u64 {
        string_hash(key)
    }

    fn eq(&self, a: &&[u8], b: &&[u8]) -> bool {
        a == b
    }
}

/// Outcome of a successful [`assign_slots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assigned {
    /// Bucket index the key landed in.
    pub index: usize,
    /// Whether an existing entry for the same key was overwritten.
    pub replaced: bool,
}

enum Spot {
    Existing(usize),
    Open(usize),
}

fn home_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

/// Probe for an insertion point: the bucket already holding `key`, or the
/// first non-filled bucket on its chain. `CapacityExceeded` when every
/// bucket is filled with a different key.
fn probe_open<B, S>(slots: &[B], keying: &S, key: &B::Key) -> Result<Spot, Error>
where
    B: Slot,
    S: Keying<B::Key>,
{
    if slots.is_empty() {
        return Err(Error::CapacityExceeded);
    }
    let mut idx = home_index(keying.hash(key), slots.len());
    for _ in 0..slots.len() {
        let slot = &slots[idx];
        if slot.state() != SlotState::Filled {
            return Ok(Spot::Open(idx));
        }
        if keying.eq(key, slot.key()) {
            return Ok(Spot::Existing(idx));
        }
        idx = (idx + 1) % slots.len();
    }
    Err(Error::CapacityExceeded)
}

/// Probe by a precomputed hash and a caller-supplied match predicate.
/// Used for lookups where the probe key is not of the bucket's key type,
/// e.g. matching raw bytes against stored spans.
pub fn find_slot_by<B, F>(slots: &[B], hash: u64, matches: F) -> Option<usize>
where
    B: Slot,
    F: Fn(&B) -> bool,
{
    if slots.is_empty() {
        return None;
    }
    let mut idx = home_index(hash, slots.len());
    for _ in 0..slots.len() {
        let slot = &slots[idx];
        match slot.state() {
            SlotState::Unfilled => return None,
            state => {
                // A tombstone with a matching key ends the chain: the key
                // was deleted.
                if matches(slot) {
                    return (state == SlotState::Filled).then_some(idx);
                }
            }
        }
        idx = (idx + 1) % slots.len();
    }
    None
}

/// Find the bucket holding `key` in a fixed bucket slice.
pub fn lookup_slots<B, S>(slots: &[B], keying: &S, key: &B::Key) -> Option<usize>
where
    B: Slot,
    S: Keying<B::Key>,
{
    find_slot_by(slots, keying.hash(key), |slot| keying.eq(key, slot.key()))
}

/// Whether `key` is present in a fixed bucket slice.
pub fn contains_slots<B, S>(slots: &[B], keying: &S, key: &B::Key) -> bool
where
    B: Slot,
    S: Keying<B::Key>,
{
    lookup_slots(slots, keying, key).is_some()
}

/// Insert or replace `key` in a fixed bucket slice. Never grows; a slice
/// with no usable bucket left yields `CapacityExceeded`.
pub fn assign_slots<B, S>(
    slots: &mut [B],
    keying: &S,
    key: B::Key,
    value: B::Value,
) -> Result<Assigned, Error>
where
    B: Slot,
    S: Keying<B::Key>,
{
    match probe_open(slots, keying, &key)? {
        Spot::Existing(index) => {
            slots[index].fill(key, value);
            Ok(Assigned {
                index,
                replaced: true,
            })
        }
        Spot::Open(index) => {
            slots[index].fill(key, value);
            Ok(Assigned {
                index,
                replaced: false,
            })
        }
    }
}

/// Delete `key` from a fixed bucket slice, leaving a tombstone. Returns
/// the vacated bucket index, or `None` if the key was not present.
pub fn delete_slots<B, S>(slots: &mut [B], keying: &S, key: &B::Key) -> Option<usize>
where
    B: Slot,
    S: Keying<B::Key>,
{
    let index = lookup_slots(slots, keying, key)?;
    slots[index].erase();
    Some(index)
}

/// A plain bucket record for standalone tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Entry<K, V> {
    key: K,
    value: V,
    state: SlotState,
}

impl<K, V> Slot for Entry<K, V> {
    type Key = K;
    type Value = V;

    fn state(&self) -> SlotState {
        self.state
    }

    fn key(&self) -> &K {
        &self.key
    }

    fn value(&self) -> &V {
        &self.value
    }

    fn fill(&mut self, key: K, value: V) {
        self.key = key;
        self.value = value;
        self.state = SlotState::Filled;
    }

    fn erase(&mut self) {
        self.state = SlotState::Tombstone;
    }
}

/// Heap-owned open-addressing table over [`Entry`] buckets.
///
/// Before every insertion the load factor is checked: at 80% or above the
/// capacity grows by x1.3 (rounded down, at least one bucket) and all
/// filled buckets are rehashed, dropping tombstones. Probing therefore
/// always terminates with free slots to spare.
pub struct HashTable<K, V, S> {
    slots: Vec<Entry<K, V>>,
    length: usize,
    keying: S,
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Default,
    V: Default,
    S: Keying<K>,
{
    pub fn new(keying: S) -> Self {
        Self::with_capacity(INITIAL_CAPACITY, keying)
    }

    pub fn with_capacity(capacity: usize, keying: S) -> Self {
        let capacity = capacity.max(1);
        HashTable {
            slots: (0..capacity).map(|_| Entry::default()).collect(),
            length: 0,
            keying,
        }
    }

    /// Number of filled buckets. Tombstones do not count.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.length == self.slots.len()
    }

    /// Insert or replace `key`.
    pub fn assign(&mut self, key: K, value: V) {
        if self.length * 100 >= self.slots.len() * LOAD_THRESHOLD_PERCENT {
            self.grow();
        }
        // The load threshold keeps at least one non-filled bucket around,
        // so the probe below always finds a spot.
        if let Ok(assigned) = assign_slots(&mut self.slots, &self.keying, key, value) {
            if !assigned.replaced {
                self.length += 1;
            }
        }
    }

    pub fn lookup(&self, key: &K) -> Option<&V> {
        let index = lookup_slots(&self.slots, &self.keying, key)?;
        Some(self.slots[index].value())
    }

    pub fn contains(&self, key: &K) -> bool {
        contains_slots(&self.slots, &self.keying, key)
    }

    /// Delete `key`, leaving a tombstone. Returns whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        match delete_slots(&mut self.slots, &self.keying, key) {
            Some(_) => {
                self.length -= 1;
                true
            }
            None => false,
        }
    }

    /// Iterate over filled buckets in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots
            .iter()
            .filter(|entry| entry.state == SlotState::Filled)
            .map(|entry| (&entry.key, &entry.value))
    }

    fn grow(&mut self) {
        let old_capacity = self.slots.len();
        let new_capacity =
            (old_capacity * GROWTH_NUMERATOR / GROWTH_DENOMINATOR).max(old_capacity + 1);
        debug!("hash table resize {} -> {}", old_capacity, new_capacity);
        let old = core::mem::replace(
            &mut self.slots,
            (0..new_capacity).map(|_| Entry::default()).collect(),
        );
        for entry in old {
            if entry.state == SlotState::Filled {
                // The fresh buffer has spare capacity, this cannot fail.
                let _ = assign_slots(&mut self.slots, &self.keying, entry.key, entry.value);
            }
        }
    }
}
