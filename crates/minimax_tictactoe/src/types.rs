//! Core domain types for tic-tac-toe.

use super::position::Position;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use tracing::instrument;

/// Player in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Player {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

impl Square {
    /// Every square state, in base-3 digit order of [`BoardKey`].
    const ALL: [Square; 3] = [
        Square::Empty,
        Square::Occupied(Player::X),
        Square::Occupied(Player::O),
    ];

    /// Single character used by the board text format.
    pub fn symbol(self) -> char {
        match self {
            Square::Empty => '.',
            Square::Occupied(Player::X) => 'X',
            Square::Occupied(Player::O) => 'O',
        }
    }

    /// Inverse of [`Square::symbol`], also accepting `_` and `-` for empty
    /// and lowercase marks.
    pub fn from_symbol(c: char) -> Option<Self> {
        let c = match c.to_ascii_uppercase() {
            '_' | '-' => '.',
            other => other,
        };
        Self::ALL.into_iter().find(|square| square.symbol() == c)
    }

    fn digit(self) -> u16 {
        match self {
            Square::Empty => 0,
            Square::Occupied(Player::X) => 1,
            Square::Occupied(Player::O) => 2,
        }
    }
}

/// Errors describing a malformed board.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Index outside `0..9`.
    #[display("Position {} out of bounds (must be 0-8)", _0)]
    OutOfBounds(#[error(not(source))] usize),

    /// Mark counts that no legal game can produce.
    #[display("Unreachable mark counts: {} X, {} O", x, o)]
    BadMarkCount {
        /// Number of X marks.
        x: usize,
        /// Number of O marks.
        o: usize,
    },

    /// Text that is not a 9-cell board.
    #[display("Cannot parse board: {}", reason)]
    Parse {
        /// What went wrong.
        reason: String,
    },
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Creates a board from raw squares without checking mark counts.
    pub fn from_squares(squares: [Square; 9]) -> Self {
        Self { squares }
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.to_index()]
    }

    /// Sets the square at the given position.
    pub fn set(&mut self, pos: Position, square: Square) {
        self.squares[pos.to_index()] = square;
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Number of marks `player` has on the board.
    pub fn count(&self, player: Player) -> usize {
        self.squares
            .iter()
            .filter(|s| **s == Square::Occupied(player))
            .count()
    }

    /// Total number of marks placed (the ply count from an empty board).
    pub fn mark_count(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }

    /// Side to move, derived from mark parity. X always moves first.
    pub fn to_move(&self) -> Player {
        if self.count(Player::X) > self.count(Player::O) {
            Player::O
        } else {
            Player::X
        }
    }

    /// Checks that the mark counts are reachable from an empty board.
    #[instrument(skip(self), fields(board = %self.key()))]
    pub fn validate(&self) -> Result<(), BoardError> {
        let x = self.count(Player::X);
        let o = self.count(Player::O);
        if x == o || x == o + 1 {
            Ok(())
        } else {
            Err(BoardError::BadMarkCount { x, o })
        }
    }

    /// Cache key identifying this exact configuration.
    pub fn key(&self) -> BoardKey {
        BoardKey::from_squares(&self.squares)
    }

    /// Places `player` at `pos` for the lifetime of the returned guard.
    ///
    /// The cell is reset to empty when the guard drops, whichever way the
    /// caller leaves its scope.
    pub fn place_scoped(&mut self, pos: Position, player: Player) -> PlacedMark<'_> {
        debug_assert!(self.is_empty(pos), "scoped placement on occupied {pos}");
        self.set(pos, Square::Occupied(player));
        PlacedMark { board: self, pos }
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.squares[pos] {
                    Square::Empty => (pos + 1).to_string(),
                    occupied => occupied.symbol().to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl FromStr for Board {
    type Err = BoardError;

    /// Parses nine cells of `X`, `O`, `.`, `_` or `-`.
    ///
    /// Whitespace and the `|` and `/` separators are ignored, so
    /// `"XO./.X./..O"` and `"X O _ | . X . | . . O"` are both accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut squares = [Square::Empty; 9];
        let mut filled = 0;
        for ch in s.chars().filter(|c| !c.is_whitespace() && *c != '|' && *c != '/') {
            if filled == 9 {
                return Err(BoardError::Parse {
                    reason: format!("more than 9 cells in {s:?}"),
                });
            }
            squares[filled] = Square::from_symbol(ch).ok_or_else(|| BoardError::Parse {
                reason: format!("unexpected character {ch:?}"),
            })?;
            filled += 1;
        }
        if filled < 9 {
            return Err(BoardError::Parse {
                reason: format!("expected 9 cells, found {filled}"),
            });
        }
        Ok(Self { squares })
    }
}

/// Guard returned by [`Board::place_scoped`].
///
/// Dereferences to the board with the mark in place; dropping it empties
/// the cell again.
#[derive(Debug)]
pub struct PlacedMark<'a> {
    board: &'a mut Board,
    pos: Position,
}

impl Deref for PlacedMark<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        &*self.board
    }
}

impl DerefMut for PlacedMark<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        &mut *self.board
    }
}

impl Drop for PlacedMark<'_> {
    fn drop(&mut self) {
        self.board.set(self.pos, Square::Empty);
    }
}

/// Fixed-width key for one exact board configuration.
///
/// Cells are packed base 3 (empty 0, X 1, O 2) with cell 0 as the most
/// significant digit, so the key preserves cell order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardKey(u16);

impl BoardKey {
    fn from_squares(squares: &[Square; 9]) -> Self {
        let packed = squares
            .iter()
            .fold(0u16, |acc, square| acc * 3 + square.digit());
        Self(packed)
    }

    /// Raw packed value.
    pub fn value(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for BoardKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut digits = [0u16; 9];
        let mut rest = self.0;
        for slot in digits.iter_mut().rev() {
            *slot = rest % 3;
            rest /= 3;
        }
        for digit in digits {
            write!(f, "{}", Square::ALL[usize::from(digit)].symbol())?;
        }
        Ok(())
    }
}
