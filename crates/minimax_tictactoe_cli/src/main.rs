//! Minimax tic-tac-toe - terminal front end.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use minimax_tictactoe::GameMode;
use minimax_tictactoe_cli::{Cli, Command, load_config, run_analyze, run_play, run_selfplay};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so board output and JSON stay clean on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.seed)?;
    info!(command = ?cli.command, "Starting tictactoe");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    match cli.command {
        Command::Play {
            computer,
            two_player,
        } => {
            let mode = if two_player {
                GameMode::TwoPlayer
            } else {
                GameMode::SinglePlayer {
                    computer: computer.into(),
                }
            };
            run_play(config, mode, stdin.lock(), &mut stdout)
        }
        Command::Selfplay { games } => {
            run_selfplay(config, games, &mut stdout)?;
            Ok(())
        }
        Command::Analyze { board, json } => run_analyze(config, &board, json, &mut stdout),
    }
}
