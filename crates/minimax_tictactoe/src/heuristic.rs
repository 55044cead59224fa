//! Static move scoring layered on top of the search value.
//!
//! The search engine tells apart wins, draws and losses. Among moves with
//! the same game-theoretic value this evaluator prefers central cells,
//! forks, fork denial and lines that are still open.
//!
//! All weights are expressed in half-points ([`HALF_POINTS`] per point) so
//! the positional table (2.5 / 1.5 / 4) stays integral.

use super::position::{CellKind, Position};
use super::rules::LINES;
use super::types::{Board, Player, Square};
use tracing::{instrument, trace};

/// Score units per point.
pub const HALF_POINTS: i32 = 2;

/// Corner weight (5 scaled by 0.5).
pub const CORNER_WEIGHT: i32 = 5;
/// Edge weight (3 scaled by 0.5).
pub const EDGE_WEIGHT: i32 = 3;
/// Center weight (8 scaled by 0.5).
pub const CENTER_WEIGHT: i32 = 8;

/// Playing the cell gives the mover two open threats.
pub const FORK_CREATE: i32 = 50 * HALF_POINTS;
/// Playing the cell takes away a fork the opponent had there.
pub const FORK_DENY: i32 = 40 * HALF_POINTS;
/// Line with two mover marks and the empty cell.
pub const NEAR_WIN: i32 = 30 * HALF_POINTS;
/// Line with two opponent marks and the empty cell.
pub const BLOCK: i32 = 25 * HALF_POINTS;
/// Line with one mover mark and two empties.
pub const OWN_OPEN: i32 = 5 * HALF_POINTS;
/// Line with one opponent mark and two empties.
pub const OPPONENT_OPEN: i32 = 3 * HALF_POINTS;

/// Mark tally over one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineCount {
    mine: u8,
    theirs: u8,
    empty: u8,
}

impl LineCount {
    fn of(board: &Board, line: &[Position; 3], mover: Player) -> Self {
        line.iter().fold(
            Self {
                mine: 0,
                theirs: 0,
                empty: 0,
            },
            |mut acc, pos| {
                match board.get(*pos) {
                    Square::Empty => acc.empty += 1,
                    Square::Occupied(p) if p == mover => acc.mine += 1,
                    Square::Occupied(_) => acc.theirs += 1,
                }
                acc
            },
        )
    }
}

/// Positional weight of a cell, in half-points.
pub fn positional_weight(pos: Position) -> i32 {
    match pos.kind() {
        CellKind::Corner => CORNER_WEIGHT,
        CellKind::Edge => EDGE_WEIGHT,
        CellKind::Center => CENTER_WEIGHT,
    }
}

/// Number of lines holding exactly two `player` marks and one empty cell.
pub fn open_threats(board: &Board, player: Player) -> usize {
    LINES
        .iter()
        .map(|line| LineCount::of(board, line, player))
        .filter(|count| count.mine == 2 && count.empty == 1)
        .count()
}

/// True if `player` marking the empty `pos` leaves two or more open threats.
pub fn creates_fork(board: &Board, pos: Position, player: Player) -> bool {
    if !board.is_empty(pos) {
        return false;
    }
    let mut scratch = board.clone();
    scratch.set(pos, Square::Occupied(player));
    open_threats(&scratch, player) >= 2
}

/// Heuristic score for `mover` playing the empty cell `pos`, in half-points.
///
/// Deterministic: equal inputs always give equal scores.
#[instrument(level = "trace", skip(board), fields(board = %board.key()))]
pub fn evaluate(board: &Board, pos: Position, mover: Player) -> i32 {
    let mut score = positional_weight(pos);

    if creates_fork(board, pos, mover) {
        score += FORK_CREATE;
    }
    if creates_fork(board, pos, mover.opponent()) {
        score += FORK_DENY;
    }

    for line in LINES.iter().filter(|line| line.contains(&pos)) {
        let count = LineCount::of(board, line, mover);
        score += match (count.mine, count.theirs, count.empty) {
            (2, 0, 1) => NEAR_WIN,
            (0, 2, 1) => BLOCK,
            (1, 0, 2) => OWN_OPEN,
            (0, 1, 2) => OPPONENT_OPEN,
            _ => 0,
        };
    }

    trace!(score, "heuristic score");
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_is_pure_position() {
        let board = Board::new();
        assert_eq!(evaluate(&board, Position::Center, Player::X), CENTER_WEIGHT);
        assert_eq!(evaluate(&board, Position::TopLeft, Player::X), CORNER_WEIGHT);
        assert_eq!(evaluate(&board, Position::TopCenter, Player::X), EDGE_WEIGHT);
    }

    #[test]
    fn test_near_win_and_block_lines() {
        // X X . / O O . / . . .
        let board: Board = "XX./OO./...".parse().unwrap();
        // TopRight: row 0 is a near win for X, O would fork there (row 1 and
        // the anti-diagonal), column 2 is empty and the anti-diagonal holds
        // one O.
        let top_right = evaluate(&board, Position::TopRight, Player::X);
        assert_eq!(top_right, CORNER_WEIGHT + FORK_DENY + NEAR_WIN + OPPONENT_OPEN);

        let middle_right = evaluate(&board, Position::MiddleRight, Player::X);
        // row 1 blocks O; column 2 is empty.
        assert_eq!(middle_right, EDGE_WEIGHT + BLOCK);
    }

    #[test]
    fn test_fork_creation_detected() {
        // X holds opposite corners; TopRight threatens the top row and the
        // right column at once.
        let board: Board = "X../.O./..X".parse().unwrap();
        assert!(creates_fork(&board, Position::TopRight, Player::X));
        assert!(creates_fork(&board, Position::BottomLeft, Player::X));
        assert!(!creates_fork(&board, Position::TopCenter, Player::X));
        // Row 0 and column 2 each hold one X and two empties before the
        // move; the anti-diagonal holds the O.
        let score = evaluate(&board, Position::TopRight, Player::X);
        assert_eq!(score, CORNER_WEIGHT + FORK_CREATE + 2 * OWN_OPEN + OPPONENT_OPEN);
        assert_eq!(score, 131);
    }

    #[test]
    fn test_fork_denial_scored_for_opponent_fork() {
        let board: Board = "X../.O./..X".parse().unwrap();
        // O playing TopRight takes the cell X wanted for its fork.
        let score = evaluate(&board, Position::TopRight, Player::O);
        assert!(!creates_fork(&board, Position::TopRight, Player::O));
        assert_eq!(score, CORNER_WEIGHT + FORK_DENY + 2 * OPPONENT_OPEN + OWN_OPEN);
        assert_eq!(score, 107);
    }

    #[test]
    fn test_deterministic() {
        let board: Board = "X.O/.X./...".parse().unwrap();
        for pos in Position::valid_moves(&board) {
            assert_eq!(
                evaluate(&board, pos, Player::O),
                evaluate(&board, pos, Player::O)
            );
        }
    }

    #[test]
    fn test_open_threats_counts_lines() {
        let board: Board = "XX./X../...".parse().unwrap();
        assert_eq!(open_threats(&board, Player::X), 2);
        assert_eq!(open_threats(&board, Player::O), 0);
    }
}
