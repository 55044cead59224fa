//! Move selection: opening shortcuts, full search, overrides, tie-break.
//!
//! One decision walks these stages in order and stops at the first that
//! settles it:
//!
//! 1. opening book (empty board, or the mover's second move),
//! 2. full search of every legal move, heuristic added as a tie-breaker,
//! 3. an immediate win among the best-scored moves,
//! 4. a forced block of an opponent line anywhere on the board,
//! 5. uniform random choice among the best-scored moves.

use super::config::EngineConfig;
use super::heuristic;
use super::position::Position;
use super::rules::{TerminalState, evaluate_terminal, wins_immediately};
use super::search::{SCORE_INF, Searcher};
use super::types::{Board, BoardError, Player};
use derive_more::{Display, Error};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Multiplier applied to the search value before the heuristic is added.
///
/// Larger than any heuristic score, so the heuristic only orders moves the
/// search rates as equal.
pub const SEARCH_WEIGHT: i32 = 1024;

/// Why `choose_move` refused to pick a cell.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SelectError {
    /// The board already has a winner or no empty cell.
    #[display("Game is already over: {:?}", _0)]
    GameOver(#[error(not(source))] TerminalState),

    /// The requested mover is not the side to move.
    #[display("It's {}'s turn, not {}'s", expected, got)]
    WrongMover {
        /// Side to move according to mark parity.
        expected: Player,
        /// Mover the caller asked for.
        got: Player,
    },

    /// The board could not arise in a legal game.
    #[display("Invalid board: {}", _0)]
    InvalidBoard(BoardError),
}

impl From<BoardError> for SelectError {
    fn from(err: BoardError) -> Self {
        Self::InvalidBoard(err)
    }
}

/// Stage of the selector that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SelectionStage {
    /// Center or corner shortcut.
    OpeningBook,
    /// A best-scored move completes a line.
    ImmediateWin,
    /// The opponent would complete a line at the chosen cell.
    ForcedBlock,
    /// A single move had the best score.
    BestScore,
    /// Random pick among equally scored moves.
    RandomTiebreak,
}

/// Scores the selector computed for one candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAnalysis {
    /// Candidate cell.
    pub position: Position,
    /// Minimax value after the move, from the mover's perspective.
    pub search_value: i32,
    /// Heuristic score in half-points.
    pub heuristic: i32,
    /// `search_value * SEARCH_WEIGHT + heuristic`.
    pub score: i32,
}

/// Outcome of one move decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Chosen cell.
    pub position: Position,
    /// Stage that settled the choice.
    pub stage: SelectionStage,
    /// Moves sharing the best score (empty for opening moves).
    pub tied: Vec<Position>,
    /// Every candidate scored by the full search (empty for opening moves).
    pub candidates: Vec<MoveAnalysis>,
}

/// Computer player: search state plus tie-break randomness.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    searcher: Searcher,
    rng: StdRng,
}

impl Engine {
    /// Creates an engine from configuration.
    #[instrument(
        skip(config),
        fields(cache_capacity = config.cache_capacity(), seed = ?config.seed())
    )]
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(*seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            searcher: Searcher::new(*config.cache_capacity()),
            config,
            rng,
        }
    }

    /// Picks the cell `mover` should play on `board`.
    ///
    /// # Errors
    ///
    /// Fails if the game is already over, if `mover` is not the side to
    /// move, or if the mark counts are impossible.
    #[instrument(skip(self, board), fields(board = %board.key()))]
    pub fn choose_move(&mut self, board: &Board, mover: Player) -> Result<Position, SelectError> {
        self.decide(board, mover).map(|decision| decision.position)
    }

    /// Like [`Engine::choose_move`] but draws tie-breaks from `rng`.
    #[instrument(skip(self, board, rng), fields(board = %board.key()))]
    pub fn choose_move_with_rng<R: Rng + ?Sized>(
        &mut self,
        board: &Board,
        mover: Player,
        rng: &mut R,
    ) -> Result<Position, SelectError> {
        select(&self.config, &mut self.searcher, board, mover, rng).map(|d| d.position)
    }

    /// Full decision record for `mover` on `board`.
    pub fn decide(&mut self, board: &Board, mover: Player) -> Result<Decision, SelectError> {
        let Self {
            config,
            searcher,
            rng,
        } = self;
        select(config, searcher, board, mover, rng)
    }

    /// Search and heuristic scores for every legal move, opening book skipped.
    #[instrument(skip(self, board), fields(board = %board.key()))]
    pub fn analyze(
        &mut self,
        board: &Board,
        mover: Player,
    ) -> Result<Vec<MoveAnalysis>, SelectError> {
        check_preconditions(board, mover)?;
        Ok(score_moves(&mut self.searcher, board, mover))
    }

    /// Drops cached search values, e.g. when a game ends.
    #[instrument(skip(self), fields(entries = self.searcher.cache().len()))]
    pub fn reset(&mut self) {
        debug!("clearing search cache");
        self.searcher.clear_cache();
    }

    /// The underlying searcher, for cache and statistics inspection.
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn check_preconditions(board: &Board, mover: Player) -> Result<(), SelectError> {
    board.validate()?;
    let terminal = evaluate_terminal(board);
    if terminal.is_over() {
        warn!(?terminal, "move requested on a finished board");
        return Err(SelectError::GameOver(terminal));
    }
    let expected = board.to_move();
    if mover != expected {
        warn!(%expected, got = %mover, "move requested for the wrong side");
        return Err(SelectError::WrongMover {
            expected,
            got: mover,
        });
    }
    Ok(())
}

/// Center or corner shortcut, played without searching.
///
/// The shortcut never loses, but it does not always pick the strongest
/// move: with X and O on two corners, the center draws where a corner would
/// force a win.
fn opening_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Position> {
    match board.mark_count() {
        0 => Some(Position::Center),
        2 if board.is_empty(Position::Center) => Some(Position::Center),
        2 => {
            let corners: Vec<Position> = Position::CORNERS
                .into_iter()
                .filter(|pos| board.is_empty(*pos))
                .collect();
            corners.choose(rng).copied()
        }
        _ => None,
    }
}

fn score_moves(searcher: &mut Searcher, board: &Board, mover: Player) -> Vec<MoveAnalysis> {
    let mut work = board.clone();
    Position::valid_moves(board)
        .into_iter()
        .map(|position| {
            let search_value = {
                let mut placed = work.place_scoped(position, mover);
                searcher.search(&mut placed, 1, false, -SCORE_INF, SCORE_INF)
            };
            let heuristic = heuristic::evaluate(&work, position, mover);
            MoveAnalysis {
                position,
                search_value,
                heuristic,
                score: search_value * SEARCH_WEIGHT + heuristic,
            }
        })
        .collect()
}

fn select<R: Rng + ?Sized>(
    config: &EngineConfig,
    searcher: &mut Searcher,
    board: &Board,
    mover: Player,
    rng: &mut R,
) -> Result<Decision, SelectError> {
    check_preconditions(board, mover)?;

    if *config.opening_book()
        && let Some(position) = opening_move(board, rng)
    {
        debug!(%position, "opening book move");
        return Ok(Decision {
            position,
            stage: SelectionStage::OpeningBook,
            tied: Vec::new(),
            candidates: Vec::new(),
        });
    }

    let candidates = score_moves(searcher, board, mover);
    let best = candidates
        .iter()
        .map(|c| c.score)
        .max()
        .unwrap_or(-SCORE_INF);
    let tied: Vec<Position> = candidates
        .iter()
        .filter(|c| c.score == best)
        .map(|c| c.position)
        .collect();

    let (position, stage) = if let Some(win) = tied
        .iter()
        .copied()
        .find(|pos| wins_immediately(board, *pos, mover))
    {
        (win, SelectionStage::ImmediateWin)
    } else if let Some(block) = Position::valid_moves(board)
        .into_iter()
        .find(|pos| wins_immediately(board, *pos, mover.opponent()))
    {
        (block, SelectionStage::ForcedBlock)
    } else if let [only] = tied.as_slice() {
        (*only, SelectionStage::BestScore)
    } else {
        // A non-terminal board always has at least one legal move.
        let pick = tied.choose(rng).copied().unwrap_or(candidates[0].position);
        (pick, SelectionStage::RandomTiebreak)
    };

    debug!(
        %position,
        %stage,
        best,
        tied = tied.len(),
        searched = candidates.len(),
        "move selected"
    );
    Ok(Decision {
        position,
        stage,
        tied,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::WIN_BASE;
    use std::collections::HashSet;

    fn seeded() -> Engine {
        Engine::new(EngineConfig::default().with_seed(Some(42)))
    }

    #[test]
    fn test_opening_takes_center() {
        let mut engine = seeded();
        let decision = engine.decide(&Board::new(), Player::X).unwrap();
        assert_eq!(decision.position, Position::Center);
        assert_eq!(decision.stage, SelectionStage::OpeningBook);
    }

    #[test]
    fn test_second_move_takes_corner_when_center_taken() {
        let mut engine = seeded();
        // X took a corner, O the center.
        let board: Board = "X...O....".parse().unwrap();
        let choice = engine.choose_move(&board, Player::X).unwrap();
        assert!(Position::CORNERS.contains(&choice));
        assert!(board.is_empty(choice));
    }

    #[test]
    fn test_immediate_win_beats_block() {
        let mut engine = seeded();
        // Both sides have two in a row; X to move wins at TopRight.
        let board: Board = "XX.OO....".parse().unwrap();
        let decision = engine.decide(&board, Player::X).unwrap();
        assert_eq!(decision.position, Position::TopRight);
        assert_eq!(decision.stage, SelectionStage::ImmediateWin);
    }

    #[test]
    fn test_candidates_rank_search_before_heuristic() {
        let mut engine = seeded();
        let board: Board = "XX.OO....".parse().unwrap();
        let candidates = engine.analyze(&board, Player::X).unwrap();
        let win = candidates
            .iter()
            .find(|c| c.position == Position::TopRight)
            .unwrap();
        assert_eq!(win.search_value, WIN_BASE - 1);
        assert!(candidates.iter().all(|c| c.score <= win.score));
    }

    #[test]
    fn test_rejects_finished_and_wrong_mover() {
        let mut engine = seeded();
        let won: Board = "XXX/OO./...".parse().unwrap();
        assert!(matches!(
            engine.choose_move(&won, Player::O),
            Err(SelectError::GameOver(_))
        ));

        assert_eq!(
            engine.choose_move(&Board::new(), Player::O),
            Err(SelectError::WrongMover {
                expected: Player::X,
                got: Player::O
            })
        );

        let bad: Board = "XXX......".parse().unwrap();
        assert!(matches!(
            engine.choose_move(&bad, Player::O),
            Err(SelectError::InvalidBoard(_))
        ));
    }

    #[test]
    fn test_opening_book_can_be_disabled() {
        let mut engine = Engine::new(
            EngineConfig::default()
                .with_seed(Some(1))
                .with_opening_book(false),
        );
        let decision = engine.decide(&Board::new(), Player::X).unwrap();
        assert_ne!(decision.stage, SelectionStage::OpeningBook);
        assert_eq!(decision.candidates.len(), 9);
        // Every opening move draws with best play.
        assert!(decision.candidates.iter().all(|c| c.search_value == 0));
    }

    #[test]
    fn test_random_tiebreak_picks_from_tied_set() {
        let mut engine = Engine::new(
            EngineConfig::default()
                .with_seed(Some(8))
                .with_opening_book(false),
        );
        // X corner, O center: TopRight and BottomLeft mirror each other across
        // the X-O diagonal and score alike.
        let board: Board = "X...O....".parse().unwrap();
        let decision = engine.decide(&board, Player::X).unwrap();
        assert_eq!(decision.stage, SelectionStage::RandomTiebreak);
        assert!(decision.tied.len() >= 2);
        assert!(decision.tied.contains(&decision.position));

        let mut picks = HashSet::new();
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pick = engine
                .choose_move_with_rng(&board, Player::X, &mut rng)
                .unwrap();
            assert!(decision.tied.contains(&pick), "seed {seed} chose {pick}");
            picks.insert(pick);
        }
        assert!(picks.len() >= 2);
    }

    #[test]
    fn test_seeded_rng_repeats_choice() {
        let mut engine = Engine::new(EngineConfig::default().with_opening_book(false));
        let board: Board = "X...O....".parse().unwrap();
        let first = engine
            .choose_move_with_rng(&board, Player::X, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let second = engine
            .choose_move_with_rng(&board, Player::X, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(first, second);
    }
}
