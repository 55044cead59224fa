//! Game session: board, history, undo and running score for one table.
//!
//! The session is the caller side of the engine. It applies moves, asks the
//! engine for the computer's move in single-player mode, keeps an in-memory
//! tally across games and clears the search cache whenever a game ends.

use super::position::Position;
use super::rules::{GameStatus, evaluate_terminal, winning_line};
use super::selector::{Engine, SelectError};
use super::types::{Board, Player, Square};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Who is at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Two humans share the board.
    TwoPlayer,
    /// One human against the engine.
    SinglePlayer {
        /// Mark the engine plays.
        computer: Player,
    },
}

/// One placed mark, as kept in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// The player making the move.
    pub player: Player,
    /// The position where the player placed their mark.
    pub position: Position,
}

impl MoveRecord {
    /// `name: (row,col)` with 1-based coordinates.
    pub fn describe(&self, name: &str) -> String {
        format!(
            "{}: ({},{})",
            name,
            self.position.row() + 1,
            self.position.col() + 1
        )
    }
}

impl std::fmt::Display for MoveRecord {
    /// `X: (row,col)` with 1-based coordinates.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe(&self.player.to_string()))
    }
}

/// Error that can occur when applying or reverting a move.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// The square at the position is already occupied.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(#[error(not(source))] Position),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// Undo requested on an empty history.
    #[display("No move to undo")]
    NothingToUndo,

    /// The computer was asked to move out of turn.
    #[display("It's not the computer's turn")]
    NotComputerTurn,

    /// The engine refused the position.
    #[display("Engine error: {}", _0)]
    Select(SelectError),
}

impl From<SelectError> for MoveError {
    fn from(err: SelectError) -> Self {
        Self::Select(err)
    }
}

/// Games won by each side and games drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ScoreBoard {
    /// Games won by X.
    x_wins: u32,
    /// Games won by O.
    o_wins: u32,
    /// Games drawn.
    draws: u32,
}

impl ScoreBoard {
    /// Counts a finished game; `InProgress` is ignored.
    pub fn record(&mut self, status: GameStatus) {
        match status {
            GameStatus::Won(Player::X) => self.x_wins += 1,
            GameStatus::Won(Player::O) => self.o_wins += 1,
            GameStatus::Draw => self.draws += 1,
            GameStatus::InProgress => {}
        }
    }

    fn revert(&mut self, status: GameStatus) {
        match status {
            GameStatus::Won(Player::X) => self.x_wins = self.x_wins.saturating_sub(1),
            GameStatus::Won(Player::O) => self.o_wins = self.o_wins.saturating_sub(1),
            GameStatus::Draw => self.draws = self.draws.saturating_sub(1),
            GameStatus::InProgress => {}
        }
    }

    /// Games finished so far.
    pub fn total(&self) -> u32 {
        self.x_wins + self.o_wins + self.draws
    }
}

/// A sequence of games at one table.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    history: Vec<MoveRecord>,
    status: GameStatus,
    mode: GameMode,
    names: [String; 2],
    scores: ScoreBoard,
    engine: Engine,
}

impl GameSession {
    /// Creates a session with an empty board.
    #[instrument(skip(engine))]
    pub fn new(mode: GameMode, engine: Engine) -> Self {
        info!("Creating new game session");
        Self {
            board: Board::new(),
            history: Vec::new(),
            status: GameStatus::InProgress,
            mode,
            names: ["X".to_string(), "O".to_string()],
            scores: ScoreBoard::default(),
            engine,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the move history.
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Returns the game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the table mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Running tally across games.
    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    /// The engine used for computer moves.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Side to move.
    pub fn to_move(&self) -> Player {
        self.board.to_move()
    }

    /// Completed line, for highlighting.
    pub fn winning_line(&self) -> Option<[Position; 3]> {
        winning_line(&self.board).map(|(_, line)| line)
    }

    /// Display name of `player`.
    pub fn player_name(&self, player: Player) -> &str {
        &self.names[slot(player)]
    }

    /// Renames `player`; an empty name falls back to the mark.
    #[instrument(skip(self))]
    pub fn set_player_name(&mut self, player: Player, name: &str) {
        let name = name.trim();
        self.names[slot(player)] = if name.is_empty() {
            player.to_string()
        } else {
            name.to_string()
        };
    }

    /// True when the engine should move next.
    pub fn is_computer_turn(&self) -> bool {
        match self.mode {
            GameMode::SinglePlayer { computer } => {
                self.status == GameStatus::InProgress && self.to_move() == computer
            }
            GameMode::TwoPlayer => false,
        }
    }

    /// History lines in the `Name: (row,col)` form.
    pub fn history_log(&self) -> Vec<String> {
        self.history
            .iter()
            .map(|record| record.describe(self.player_name(record.player)))
            .collect()
    }

    /// Places the side-to-move's mark at `position`.
    #[instrument(skip(self), fields(player = %self.to_move()))]
    pub fn play(&mut self, position: Position) -> Result<GameStatus, MoveError> {
        if self.status != GameStatus::InProgress {
            warn!("move after game over");
            return Err(MoveError::GameOver);
        }
        if !self.board.is_empty(position) {
            warn!(%position, "square occupied");
            return Err(MoveError::SquareOccupied(position));
        }

        let player = self.to_move();
        self.board.set(position, Square::Occupied(player));
        self.history.push(MoveRecord { player, position });
        debug!(%position, moves = self.history.len(), "move applied");

        self.status = evaluate_terminal(&self.board).status();
        if self.status != GameStatus::InProgress {
            self.finish();
        }
        Ok(self.status)
    }

    /// Asks the engine for its move and plays it.
    #[instrument(skip(self))]
    pub fn play_computer(&mut self) -> Result<Position, MoveError> {
        if self.status != GameStatus::InProgress {
            return Err(MoveError::GameOver);
        }
        if !self.is_computer_turn() {
            return Err(MoveError::NotComputerTurn);
        }
        let position = self.engine.choose_move(&self.board, self.to_move())?;
        self.play(position)?;
        Ok(position)
    }

    /// Takes back the last move.
    ///
    /// Undoing the move that ended a game reopens it and takes the result
    /// off the scoreboard.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> Result<MoveRecord, MoveError> {
        let record = self.history.pop().ok_or(MoveError::NothingToUndo)?;
        self.board.set(record.position, Square::Empty);
        if self.status != GameStatus::InProgress {
            self.scores.revert(self.status);
            self.status = GameStatus::InProgress;
        }
        debug!(%record, "move undone");
        Ok(record)
    }

    /// Takes back moves until it is a human's turn again.
    ///
    /// In single-player mode this removes the computer's reply together with
    /// the human move before it.
    #[instrument(skip(self))]
    pub fn undo_turn(&mut self) -> Result<Vec<MoveRecord>, MoveError> {
        let mut undone = vec![self.undo()?];
        while self.is_computer_turn() && !self.history.is_empty() {
            undone.push(self.undo()?);
        }
        Ok(undone)
    }

    /// Clears the board for a new game; scores are kept.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) {
        self.board = Board::new();
        self.history.clear();
        self.status = GameStatus::InProgress;
        self.engine.reset();
    }

    /// Zeroes the scoreboard.
    pub fn reset_scores(&mut self) {
        self.scores = ScoreBoard::default();
    }

    fn finish(&mut self) {
        self.scores.record(self.status);
        self.engine.reset();
        match self.status {
            GameStatus::Won(player) => info!(
                winner = %self.player_name(player),
                moves = self.history.len(),
                "game won"
            ),
            _ => info!(moves = self.history.len(), "game drawn"),
        }
    }
}

fn slot(player: Player) -> usize {
    match player {
        Player::X => 0,
        Player::O => 1,
    }
}
