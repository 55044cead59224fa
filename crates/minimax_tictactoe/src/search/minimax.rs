//! Minimax with alpha-beta pruning over the remaining game tree.

use super::cache::{Bound, SearchCache};
use crate::position::Position;
use crate::rules::{check_winner, is_full};
use crate::types::Board;
use derive_getters::Getters;
use tracing::{instrument, trace};

/// Base value of a win; the depth of the win is subtracted so faster wins
/// score higher and slower losses score less negative.
pub const WIN_BASE: i32 = 1000;

/// Window bound larger than any reachable score.
pub const SCORE_INF: i32 = 1_000_000;

/// Counters accumulated across searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct SearchStats {
    /// Calls to [`Searcher::search`], recursive ones included.
    nodes: u64,
    /// Non-terminal nodes whose children were generated.
    expansions: u64,
    /// Calls answered from the cache.
    cache_hits: u64,
    /// Values written to the cache.
    cache_stores: u64,
    /// Nodes that stopped early on `beta <= alpha`.
    cutoffs: u64,
}

/// Game-tree searcher owning its transposition cache.
#[derive(Debug, Clone, Default)]
pub struct Searcher {
    cache: SearchCache,
    stats: SearchStats,
}

impl Searcher {
    /// Creates a searcher whose cache holds at most `cache_capacity` boards.
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: SearchCache::new(cache_capacity),
            stats: SearchStats::default(),
        }
    }

    /// Value of `board` for the maximizing side.
    ///
    /// `maximizing` tells whether the side to move on `board` (given by mark
    /// parity) is the maximizing side; `depth` is the ply count from the
    /// decision being made. The board is mutated while searching and is
    /// returned unchanged.
    ///
    /// - maximizer has a line: `WIN_BASE - depth`
    /// - minimizer has a line: `depth - WIN_BASE`
    /// - full board: `0`
    pub fn search(
        &mut self,
        board: &mut Board,
        depth: i32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.stats.nodes += 1;
        let key = board.key();

        if let Some(cached) = self.cache.probe(key, depth, maximizing)
            && let Some(score) = cached.usable(alpha, beta)
        {
            self.stats.cache_hits += 1;
            return score;
        }

        let mover = board.to_move();
        if let Some(winner) = check_winner(board) {
            // The player who just moved completed the line.
            let maximizer = if maximizing { mover } else { mover.opponent() };
            return if winner == maximizer {
                WIN_BASE - depth
            } else {
                depth - WIN_BASE
            };
        }
        if is_full(board) {
            return 0;
        }

        self.stats.expansions += 1;
        let (alpha0, beta0) = (alpha, beta);
        let mut best = if maximizing { -SCORE_INF } else { SCORE_INF };

        for pos in Position::ALL {
            if !board.is_empty(pos) {
                continue;
            }
            let score = {
                let mut placed = board.place_scoped(pos, mover);
                self.search(&mut placed, depth + 1, !maximizing, alpha, beta)
            };

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if beta <= alpha {
                self.stats.cutoffs += 1;
                trace!(%key, depth, best, "alpha-beta cutoff");
                break;
            }
        }

        let bound = if best <= alpha0 {
            Bound::Upper
        } else if best >= beta0 {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.cache.store(key, depth, maximizing, best, bound);
        self.stats.cache_stores += 1;
        best
    }

    /// Value of `board` with the full window.
    #[instrument(skip(self, board), fields(board = %board.key()))]
    pub fn evaluate_position(&mut self, board: &mut Board, depth: i32, maximizing: bool) -> i32 {
        self.search(board, depth, maximizing, -SCORE_INF, SCORE_INF)
    }

    /// Counters so far.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// The transposition cache.
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Drops cached values, e.g. at the end of a game.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
