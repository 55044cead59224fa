//! Subcommand implementations.

use anyhow::{Context, Result};
use minimax_tictactoe::{
    Board, Decision, Engine, EngineConfig, GameMode, GameSession, GameStatus, MoveAnalysis,
    MoveError, Player, Position, ScoreBoard, Square, TerminalState, evaluate_terminal,
};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Reads the config file if one is given and applies the seed override.
#[instrument]
pub fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    Ok(match seed {
        Some(seed) => config.with_seed(Some(seed)),
        None => config,
    })
}

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Cell(Position),
    Undo,
    NewGame,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_lowercase().as_str() {
        "u" | "undo" => Some(Input::Undo),
        "n" | "new" => Some(Input::NewGame),
        "q" | "quit" => Some(Input::Quit),
        other => match other.parse::<usize>() {
            Ok(n) if (1..=9).contains(&n) => Position::from_index(n - 1).map(Input::Cell),
            Ok(_) => None,
            Err(_) => Position::from_label_or_number(other).map(Input::Cell),
        },
    }
}

fn print_board<W: Write>(out: &mut W, session: &GameSession) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", session.board().display())?;
    writeln!(out)?;
    Ok(())
}

fn print_scores<W: Write>(out: &mut W, session: &GameSession) -> Result<()> {
    let scores = session.scores();
    writeln!(
        out,
        "Score - {}: {}  {}: {}  Draws: {}",
        session.player_name(Player::X),
        scores.x_wins(),
        session.player_name(Player::O),
        scores.o_wins(),
        scores.draws()
    )?;
    Ok(())
}

fn announce<W: Write>(out: &mut W, session: &GameSession) -> Result<()> {
    match session.status() {
        GameStatus::Won(player) => {
            let line = session
                .winning_line()
                .map(|line| {
                    line.iter()
                        .map(|pos| (pos.to_index() + 1).to_string())
                        .collect::<Vec<_>>()
                        .join("-")
                })
                .unwrap_or_default();
            writeln!(out, "{} wins! ({})", session.player_name(player), line)?;
        }
        GameStatus::Draw => writeln!(out, "It's a draw!")?,
        GameStatus::InProgress => return Ok(()),
    }
    print_scores(out, session)?;
    writeln!(out, "Press n for a new game or q to quit.")?;
    Ok(())
}

/// Interactive game on `input` / `out`.
///
/// Cells are entered as 1-9 (row-major), `u` undoes the last turn, `n`
/// starts a new game and `q` quits. End of input also quits.
#[instrument(skip(config, input, out))]
pub fn run_play<R: BufRead, W: Write>(
    config: EngineConfig,
    mode: GameMode,
    mut input: R,
    out: &mut W,
) -> Result<()> {
    let delay = Duration::from_millis(*config.move_delay_ms());
    let mut session = GameSession::new(mode, Engine::new(config));
    if let GameMode::SinglePlayer { computer } = mode {
        session.set_player_name(computer, "Computer");
        session.set_player_name(computer.opponent(), "You");
    }

    let mut line = String::new();
    loop {
        if session.is_computer_turn() {
            std::thread::sleep(delay);
            let pos = session.play_computer()?;
            writeln!(out, "Computer plays {}", pos.to_index() + 1)?;
            print_board(out, &session)?;
            announce(out, &session)?;
            continue;
        }

        if session.status() == GameStatus::InProgress {
            write!(out, "{} to move (1-9, u, n, q): ", session.player_name(session.to_move()))?;
        } else {
            write!(out, "> ")?;
        }
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("input closed");
            break;
        }

        let Some(command) = parse_input(&line) else {
            writeln!(out, "Enter a cell 1-9, u, n or q.")?;
            continue;
        };

        match command {
            Input::Quit => break,
            Input::NewGame => {
                session.new_game();
                print_board(out, &session)?;
            }
            Input::Undo => match session.undo_turn() {
                Ok(undone) => {
                    for record in &undone {
                        writeln!(out, "Undid {}", record)?;
                    }
                    print_board(out, &session)?;
                }
                Err(err) => writeln!(out, "{}", err)?,
            },
            Input::Cell(pos) => match session.play(pos) {
                Ok(_) => {
                    print_board(out, &session)?;
                    announce(out, &session)?;
                }
                Err(err @ (MoveError::SquareOccupied(_) | MoveError::GameOver)) => {
                    writeln!(out, "{}", err)?;
                }
                Err(err) => return Err(err.into()),
            },
        }
    }

    writeln!(out, "Moves this game: {}", session.history_log().join(", "))?;
    print_scores(out, &session)?;
    Ok(())
}

/// Plays `games` engine-vs-engine games and prints the tally.
#[instrument(skip(config, out))]
pub fn run_selfplay<W: Write>(config: EngineConfig, games: u32, out: &mut W) -> Result<ScoreBoard> {
    let mut engine = Engine::new(config);
    let mut scores = ScoreBoard::default();

    for game in 1..=games {
        let mut board = Board::new();
        let status = loop {
            let status = evaluate_terminal(&board).status();
            if status != GameStatus::InProgress {
                break status;
            }
            let mover = board.to_move();
            let pos = engine.choose_move(&board, mover)?;
            board.set(pos, Square::Occupied(mover));
        };
        if status != GameStatus::Draw {
            warn!(game, ?status, "self-play game was decided");
        }
        scores.record(status);
        engine.reset();
        debug!(game, ?status, "self-play game finished");
    }

    info!(games, draws = scores.draws(), "self-play complete");
    writeln!(
        out,
        "{} games: X wins {}, O wins {}, draws {}",
        games,
        scores.x_wins(),
        scores.o_wins(),
        scores.draws()
    )?;
    Ok(scores)
}

/// Everything `analyze` reports about a board.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// The board as parsed.
    pub board: Board,
    /// Side to move by mark parity.
    pub to_move: Player,
    /// Winner and draw flag.
    pub terminal: TerminalState,
    /// Engine decision, absent on a finished board.
    pub decision: Option<Decision>,
}

/// Builds the report for a board given in text form.
#[instrument(skip(engine))]
pub fn analyze_board(engine: &mut Engine, text: &str) -> Result<AnalysisReport> {
    let board: Board = text.parse().context("parsing board")?;
    board.validate()?;
    let terminal = evaluate_terminal(&board);
    let to_move = board.to_move();
    let decision = if terminal.is_over() {
        None
    } else {
        Some(engine.decide(&board, to_move)?)
    };
    Ok(AnalysisReport {
        board,
        to_move,
        terminal,
        decision,
    })
}

fn write_candidates<W: Write>(out: &mut W, candidates: &[MoveAnalysis]) -> Result<()> {
    writeln!(out, "{:>5} {:>8} {:>10} {:>9}", "cell", "search", "heuristic", "score")?;
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    for c in &sorted {
        writeln!(
            out,
            "{:>5} {:>8} {:>10} {:>9}",
            c.position.to_index() + 1,
            c.search_value,
            c.heuristic,
            c.score
        )?;
    }
    Ok(())
}

/// Prints the engine's view of `text` as a table or JSON.
#[instrument(skip(config, out))]
pub fn run_analyze<W: Write>(
    config: EngineConfig,
    text: &str,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let mut engine = Engine::new(config);
    let report = analyze_board(&mut engine, text)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{}", report.board.display())?;
    writeln!(out)?;
    match (report.terminal.winner, &report.decision) {
        (Some(winner), _) => writeln!(out, "Game over: {} wins", winner)?,
        (None, None) => writeln!(out, "Game over: draw")?,
        (None, Some(decision)) => {
            writeln!(
                out,
                "{} to move: play {} ({}, {})",
                report.to_move,
                decision.position.to_index() + 1,
                decision.position.label(),
                decision.stage
            )?;
            if !decision.candidates.is_empty() {
                writeln!(out)?;
                write_candidates(out, &decision.candidates)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("5\n"), Some(Input::Cell(Position::Center)));
        assert_eq!(parse_input("1"), Some(Input::Cell(Position::TopLeft)));
        assert_eq!(parse_input("0"), None);
        assert_eq!(parse_input("10"), None);
        assert_eq!(parse_input(" U "), Some(Input::Undo));
        assert_eq!(parse_input("n"), Some(Input::NewGame));
        assert_eq!(parse_input("quit"), Some(Input::Quit));
        assert_eq!(
            parse_input("bottom-right"),
            Some(Input::Cell(Position::BottomRight))
        );
        assert_eq!(parse_input("hello"), None);
    }

    #[test]
    fn test_load_config_seed_override() {
        let config = load_config(None, Some(9)).unwrap();
        assert_eq!(*config.seed(), Some(9));
        assert_eq!(*config.cache_capacity(), 1000);
    }
}
