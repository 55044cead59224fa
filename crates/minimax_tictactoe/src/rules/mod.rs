//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](super::Board): line completion, full
//! board and the combined terminal verdict. The search engine uses these as
//! its base case and the move selector uses them for its win-now and
//! block-now overrides.

pub mod draw;
pub mod terminal;
pub mod win;

pub use draw::{is_draw, is_full};
pub use terminal::{GameStatus, TerminalState, evaluate_terminal, is_terminal};
pub use win::{LINES, check_winner, winning_line, wins_immediately};
