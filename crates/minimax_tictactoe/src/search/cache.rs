//! Transposition cache keyed by exact board configuration.
//!
//! Scores are stored in a normalised form so one entry is valid whatever
//! depth the node was reached at and whichever side is maximizing:
//!
//! - perspective: the side to move on the stored board (implied by parity),
//! - win distance: counted from the stored node, not from the search root.
//!
//! Nodes cut off by alpha-beta only know a bound on their value. Those are
//! stored as [`Bound::Lower`] / [`Bound::Upper`] and reused only when the
//! bound already settles the caller's window.
//!
//! The cache is bounded: once it holds `capacity` entries the next new key
//! clears it in bulk before being inserted.

use crate::types::BoardKey;
use std::collections::HashMap;
use tracing::debug;

/// How a cached score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Search completed inside the window.
    Exact,
    /// True value is at least the score (fail-high).
    Lower,
    /// True value is at most the score (fail-low).
    Upper,
}

impl Bound {
    /// Same bound seen from the other side.
    fn flip(self) -> Self {
        match self {
            Bound::Exact => Bound::Exact,
            Bound::Lower => Bound::Upper,
            Bound::Upper => Bound::Lower,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheEntry {
    score: i32,
    bound: Bound,
}

/// Score and bound as seen by a particular search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedScore {
    /// Value from the maximizing side's perspective, adjusted to the node depth.
    pub score: i32,
    /// Bound kind from the maximizing side's perspective.
    pub bound: Bound,
}

impl CachedScore {
    /// Returns the score if it decides the node for the window `(alpha, beta)`.
    pub fn usable(self, alpha: i32, beta: i32) -> Option<i32> {
        match self.bound {
            Bound::Exact => Some(self.score),
            Bound::Lower if self.score >= beta => Some(self.score),
            Bound::Upper if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }
}

/// Bounded map from board key to normalised score.
#[derive(Debug, Clone)]
pub struct SearchCache {
    entries: HashMap<BoardKey, CacheEntry>,
    capacity: usize,
    clears: u64,
}

/// Default entry cap.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

impl SearchCache {
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            clears: 0,
        }
    }

    /// Looks up `key` for a node at `depth` where `maximizing` tells whether
    /// the side to move is the maximizing side.
    pub fn probe(&self, key: BoardKey, depth: i32, maximizing: bool) -> Option<CachedScore> {
        let entry = self.entries.get(&key)?;
        let to_move = from_node_relative(entry.score, depth);
        Some(if maximizing {
            CachedScore {
                score: to_move,
                bound: entry.bound,
            }
        } else {
            CachedScore {
                score: -to_move,
                bound: entry.bound.flip(),
            }
        })
    }

    /// Stores a maximizer-perspective `score` found at `depth`.
    ///
    /// Clears the whole cache first when a new key would exceed the cap.
    pub fn store(&mut self, key: BoardKey, depth: i32, maximizing: bool, score: i32, bound: Bound) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            debug!(
                entries = self.entries.len(),
                capacity = self.capacity,
                "search cache full, clearing"
            );
            self.entries.clear();
            self.clears += 1;
        }

        let (to_move, bound) = if maximizing {
            (score, bound)
        } else {
            (-score, bound.flip())
        };
        self.entries.insert(
            key,
            CacheEntry {
                score: to_node_relative(to_move, depth),
                bound,
            },
        );
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached boards.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries before a bulk clear.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bulk clears triggered by the cap.
    pub fn overflow_clears(&self) -> u64 {
        self.clears
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// `WIN_BASE - absolute_depth` becomes `WIN_BASE - plies_from_node`.
fn to_node_relative(score: i32, depth: i32) -> i32 {
    match score {
        s if s > 0 => s + depth,
        s if s < 0 => s - depth,
        _ => 0,
    }
}

fn from_node_relative(score: i32, depth: i32) -> i32 {
    match score {
        s if s > 0 => s - depth,
        s if s < 0 => s + depth,
        _ => 0,
    }
}
