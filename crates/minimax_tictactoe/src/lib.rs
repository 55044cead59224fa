//! Minimax tic-tac-toe - optimal move selection for a 3x3 board
//!
//! This library picks the computer's move: opening shortcuts, a full
//! minimax search with alpha-beta pruning and a transposition cache, a
//! heuristic that orders equally valued moves, and win-now / block-now
//! overrides.
//!
//! # Architecture
//!
//! - **Board**: 9 cells in row-major order, scoped mark/undo for search
//! - **Rules**: line completion, full board, terminal verdict
//! - **Heuristic**: positional weights, forks, line potential
//! - **Search**: minimax + alpha-beta over the remaining tree, memoised by board
//! - **Selector**: the [`Engine`] that turns all of the above into one cell
//! - **Session**: a table of games with undo and a running score
//!
//! # Example
//!
//! ```
//! use minimax_tictactoe::{Board, Engine, EngineConfig, Player, Position};
//!
//! # fn example() -> Result<(), minimax_tictactoe::SelectError> {
//! let mut engine = Engine::new(EngineConfig::default().with_seed(Some(7)));
//!
//! // X on the top row twice, O in the middle twice: X finishes the line.
//! let board: Board = "XX./OO./...".parse().expect("valid board");
//! assert_eq!(engine.choose_move(&board, Player::X)?, Position::TopRight);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod heuristic;
mod position;
mod rules;
mod search;
mod selector;
mod session;
mod types;

// Crate-level exports - Board state
pub use position::{CellKind, Position};
pub use types::{Board, BoardError, BoardKey, PlacedMark, Player, Square};

// Crate-level exports - Rules
pub use rules::{
    GameStatus, LINES, TerminalState, check_winner, evaluate_terminal, is_draw, is_full,
    is_terminal, winning_line, wins_immediately,
};

// Crate-level exports - Heuristic evaluator
pub use heuristic::{creates_fork, evaluate as evaluate_move, open_threats, positional_weight};

// Crate-level exports - Search engine
pub use search::{
    Bound, CachedScore, DEFAULT_CACHE_CAPACITY, SCORE_INF, SearchCache, SearchStats, Searcher,
    WIN_BASE,
};

// Crate-level exports - Move selection
pub use config::{ConfigError, EngineConfig};
pub use selector::{Decision, Engine, MoveAnalysis, SEARCH_WEIGHT, SelectError, SelectionStage};

// Crate-level exports - Sessions
pub use session::{GameMode, GameSession, MoveError, MoveRecord, ScoreBoard};
