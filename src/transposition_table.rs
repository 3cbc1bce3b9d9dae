//! Fixed-size always-replace caches for search bounds
//!
//! An entry value of 0 marks an empty slot, so stored values must be
//! offset away from 0 by the caller. Keys are truncated to 32 bits; with
//! a prime table size the combination of index and truncated key still
//! identifies a position uniquely enough in practice.

use std::sync::{atomic::*, Arc};

// prime, a little over 8M entries
const TABLE_SIZE: usize = (1 << 23) + 9;

/// Get/set interface shared by the sequential and concurrent tables, so
/// the solver can run on either
pub trait Table {
    fn get(&self, key: u64) -> u8;
    fn set(&mut self, key: u64, value: u8);
}

#[derive(Copy, Clone)]
struct Entry {
    key: u32,
    value: u8,
}

/// Single-threaded transposition table
#[derive(Clone)]
pub struct TranspositionTable {
    entries: Vec<Entry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self {
            entries: vec![Entry { key: 0, value: 0 }; TABLE_SIZE],
        }
    }
}

impl Table for TranspositionTable {
    fn get(&self, key: u64) -> u8 {
        let entry = self.entries[key as usize % TABLE_SIZE];
        if entry.key == key as u32 {
            entry.value
        } else {
            0
        }
    }

    fn set(&mut self, key: u64, value: u8) {
        self.entries[key as usize % TABLE_SIZE] = Entry {
            key: key as u32,
            value,
        };
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}

struct SharedEntry {
    key: AtomicU32,
    value: AtomicU8,
}

/// Lock-free transposition table shared between search workers
///
/// The key field stores `key ^ value`; a write torn between the two
/// atomics fails the check on read and is treated as a miss
#[derive(Clone)]
pub struct SharedTranspositionTable {
    entries: Arc<Vec<SharedEntry>>,
}

impl SharedTranspositionTable {
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(TABLE_SIZE);
        for _ in 0..TABLE_SIZE {
            entries.push(SharedEntry {
                key: AtomicU32::new(0),
                value: AtomicU8::new(0),
            });
        }
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl Table for SharedTranspositionTable {
    fn get(&self, key: u64) -> u8 {
        let entry = &self.entries[key as usize % TABLE_SIZE];
        let value = entry.value.load(Ordering::Relaxed);
        if entry.key.load(Ordering::Relaxed) == key as u32 ^ value as u32 {
            value
        } else {
            0
        }
    }

    fn set(&mut self, key: u64, value: u8) {
        let entry = &self.entries[key as usize % TABLE_SIZE];
        entry.key.store(key as u32 ^ value as u32, Ordering::Relaxed);
        entry.value.store(value, Ordering::Relaxed);
    }
}

impl Default for SharedTranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}
