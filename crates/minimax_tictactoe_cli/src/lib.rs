//! Terminal front end for the minimax tic-tac-toe engine.
//!
//! The binary is a thin wrapper: argument parsing lives in [`cli`] and each
//! subcommand in [`commands`], with input and output passed in so the
//! commands can be driven from tests.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command, Mark};
pub use commands::{AnalysisReport, load_config, run_analyze, run_play, run_selfplay};
