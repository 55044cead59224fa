//! Combined terminal verdict exposed to callers.

use super::super::{Board, Player};
use super::draw::is_full;
use super::win::check_winner;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Outcome fields a caller needs to decide end-of-game handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalState {
    /// Player holding a completed line, if any.
    pub winner: Option<Player>,
    /// Board full with no winner.
    pub is_draw: bool,
}

impl TerminalState {
    /// True when the game is over either way.
    pub fn is_over(&self) -> bool {
        self.winner.is_some() || self.is_draw
    }

    /// The same verdict as a [`GameStatus`].
    pub fn status(&self) -> GameStatus {
        match (self.winner, self.is_draw) {
            (Some(player), _) => GameStatus::Won(player),
            (None, true) => GameStatus::Draw,
            (None, false) => GameStatus::InProgress,
        }
    }
}

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game ended in a win.
    Won(Player),
    /// Game ended in a draw.
    Draw,
}

/// Winner and draw flag for `board`.
#[instrument(skip(board), fields(board = %board.key()))]
pub fn evaluate_terminal(board: &Board) -> TerminalState {
    let winner = check_winner(board);
    TerminalState {
        winner,
        is_draw: winner.is_none() && is_full(board),
    }
}

/// A line is complete or no empty cell remains.
pub fn is_terminal(board: &Board) -> bool {
    check_winner(board).is_some() || is_full(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_in_progress() {
        let state = evaluate_terminal(&Board::new());
        assert_eq!(state, TerminalState { winner: None, is_draw: false });
        assert_eq!(state.status(), GameStatus::InProgress);
        assert!(!is_terminal(&Board::new()));
    }

    #[test]
    fn test_win_is_not_draw_even_when_full() {
        let board: Board = "XXX/OOX/XOO".parse().unwrap();
        let state = evaluate_terminal(&board);
        assert_eq!(state.winner, Some(Player::X));
        assert!(!state.is_draw);
        assert_eq!(state.status(), GameStatus::Won(Player::X));
        assert!(is_terminal(&board));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board: Board = "XOX/OXX/OXO".parse().unwrap();
        let state = evaluate_terminal(&board);
        assert!(state.is_draw);
        assert!(state.is_over());
        assert_eq!(state.status(), GameStatus::Draw);
    }
}
