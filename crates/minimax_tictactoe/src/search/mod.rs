//! Game-tree search: minimax with alpha-beta pruning and a transposition
//! cache keyed by board configuration.

pub mod cache;
pub mod minimax;

pub use cache::{Bound, CachedScore, DEFAULT_CACHE_CAPACITY, SearchCache};
pub use minimax::{SCORE_INF, SearchStats, Searcher, WIN_BASE};
