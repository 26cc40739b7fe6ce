//! Transposition table for caching search results.
//!
//! Maps a [`BoardKey`] to the [`Evaluation`] last computed for it. Entries
//! are overwritten on every store (last write wins).
//!
//! # Capacity
//!
//! Board-state keys grow combinatorially with board size, so the table can
//! be bounded. Two eviction policies are available:
//!
//! - [`Eviction::Generational`]: entries live in a young and an old
//!   generation, each holding up to half the capacity. A hit in the old
//!   generation promotes the entry. When the young generation fills up it
//!   replaces the old one, dropping whatever was not touched since the last
//!   rotation. This approximates least-recently-used eviction at hash-map cost.
//! - [`Eviction::Clear`]: the whole table is dropped when it fills up.
//!
//! # Concurrency
//!
//! The table is plain mutable state; `get` and `put` take `&mut self`. One
//! search owns it for its whole call tree. Sharing a table between threads
//! requires external locking (for example `Arc<Mutex<TranspositionTable>>`),
//! or one table per concurrent search.

use std::collections::HashMap;
use std::mem;

use log::trace;
use serde::{Deserialize, Serialize};
use tictactoe_core::BoardKey;
use xxhash_rust::xxh64::Xxh64Builder;

use crate::evaluation::Evaluation;

/// Entries used when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 1 << 20;

type Map = HashMap<BoardKey, Evaluation, Xxh64Builder>;

fn new_map() -> Map {
    HashMap::with_hasher(Xxh64Builder::new(0))
}

/// What to do when a bounded table is full.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eviction {
    #[default]
    Generational,
    Clear,
}

/// Table sizing.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Maximum number of entries; `None` for an unbounded table.
    pub capacity: Option<usize>,
    pub eviction: Eviction,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: Some(DEFAULT_CAPACITY),
            eviction: Eviction::Generational,
        }
    }
}

impl TableConfig {
    /// Unbounded table, as used for single exhaustive solves.
    pub fn unbounded() -> Self {
        Self {
            capacity: None,
            eviction: Eviction::Generational,
        }
    }
}

/// Table counters.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub struct TableStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
    /// Explicit calls to [`TranspositionTable::clear`].
    pub clears: u64,
}

/// Transposition table keyed by position.
pub struct TranspositionTable {
    young: Map,
    old: Map,
    config: TableConfig,
    stats: TableStats,
}

impl TranspositionTable {
    /// Create a table. Generational tables hold at least two entries.
    pub fn new(config: TableConfig) -> Self {
        let config = match (config.capacity, config.eviction) {
            (Some(capacity), Eviction::Generational) => TableConfig {
                capacity: Some(capacity.max(2)),
                ..config
            },
            (Some(capacity), Eviction::Clear) => TableConfig {
                capacity: Some(capacity.max(1)),
                ..config
            },
            (None, _) => config,
        };
        Self {
            young: new_map(),
            old: new_map(),
            config,
            stats: TableStats::default(),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(TableConfig::unbounded())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(TableConfig {
            capacity: Some(capacity),
            eviction: Eviction::Generational,
        })
    }

    /// Look up a position. Counts a hit or a miss.
    pub fn get(&mut self, key: &BoardKey) -> Option<Evaluation> {
        if let Some(&evaluation) = self.young.get(key) {
            self.stats.hits += 1;
            return Some(evaluation);
        }
        match self.old.remove(key) {
            Some(evaluation) => {
                self.stats.hits += 1;
                self.insert_young(*key, evaluation);
                Some(evaluation)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Look up a position without touching counters or recency.
    pub fn peek(&self, key: &BoardKey) -> Option<&Evaluation> {
        self.young.get(key).or_else(|| self.old.get(key))
    }

    /// Store an evaluation, replacing any previous entry for the key.
    pub fn put(&mut self, key: BoardKey, evaluation: Evaluation) {
        self.stats.stores += 1;
        self.old.remove(&key);
        self.insert_young(key, evaluation);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        trace!("clearing transposition table ({} entries)", self.len());
        self.young.clear();
        self.old.clear();
        self.stats.clears += 1;
    }

    pub fn len(&self) -> usize {
        self.young.len() + self.old.len()
    }

    pub fn is_empty(&self) -> bool {
        self.young.is_empty() && self.old.is_empty()
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn stats(&self) -> &TableStats {
        &self.stats
    }

    /// Largest number of entries the young generation may hold.
    fn young_limit(&self) -> Option<usize> {
        self.config.capacity.map(|capacity| match self.config.eviction {
            Eviction::Generational => capacity / 2,
            Eviction::Clear => capacity,
        })
    }

    fn insert_young(&mut self, key: BoardKey, evaluation: Evaluation) {
        if let Some(limit) = self.young_limit() {
            if self.young.len() >= limit && !self.young.contains_key(&key) {
                self.make_room();
            }
        }
        self.young.insert(key, evaluation);
    }

    fn make_room(&mut self) {
        match self.config.eviction {
            Eviction::Generational => {
                let promoted = mem::replace(&mut self.young, new_map());
                let dropped = mem::replace(&mut self.old, promoted);
                trace!("rotating table generations, dropping {} entries", dropped.len());
                self.stats.evictions += dropped.len() as u64;
            }
            Eviction::Clear => {
                trace!("table full, dropping {} entries", self.young.len());
                self.stats.evictions += self.young.len() as u64;
                self.young.clear();
            }
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}
