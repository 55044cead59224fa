//! Command-line interface for the tic-tac-toe engine.

use clap::{Parser, Subcommand, ValueEnum};
use minimax_tictactoe::Player;
use std::path::PathBuf;

/// Minimax tic-tac-toe - play against or inspect an optimal engine
#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(about = "Tic-tac-toe with a minimax computer player", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to an engine config file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed for the engine's tie-breaks (overrides the config file)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Mark on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// X, moves first
    X,
    /// O, moves second
    O,
}

impl From<Mark> for Player {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Player::X,
            Mark::O => Player::O,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal
    Play {
        /// Mark the computer plays
        #[arg(long, value_enum, default_value = "o", conflicts_with = "two_player")]
        computer: Mark,

        /// Two humans, no computer
        #[arg(long)]
        two_player: bool,
    },

    /// Let the engine play itself and print the tally
    Selfplay {
        /// Number of games
        #[arg(short, long, default_value = "10")]
        games: u32,
    },

    /// Show the engine's view of a board
    Analyze {
        /// Nine cells of X, O or '.', e.g. "XO./.X./..O"
        board: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
