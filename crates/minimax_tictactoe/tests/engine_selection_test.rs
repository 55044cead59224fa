//! Tests for move selection on concrete boards.

use minimax_tictactoe::{
    Board, Engine, EngineConfig, Player, Position, SelectError, SelectionStage, Square,
    evaluate_terminal,
};
use std::collections::HashSet;

fn engine(seed: u64) -> Engine {
    Engine::new(EngineConfig::default().with_seed(Some(seed)))
}

#[test]
fn test_opening_move_is_center() {
    for seed in 0..5 {
        let choice = engine(seed).choose_move(&Board::new(), Player::X).unwrap();
        assert_eq!(choice.to_index(), 4);
    }
}

#[test]
fn test_second_move_center_when_empty() {
    let board: Board = "X.......O".parse().unwrap();
    assert_eq!(
        engine(1).choose_move(&board, Player::X).unwrap(),
        Position::Center
    );
}

#[test]
fn test_second_move_corner_when_center_taken() {
    let board: Board = "..X.O....".parse().unwrap();
    for seed in 0..10 {
        let choice = engine(seed).choose_move(&board, Player::X).unwrap();
        assert!(
            [0, 6, 8].contains(&choice.to_index()),
            "seed {seed} chose {choice}"
        );
    }
}

#[test]
fn test_forced_win_on_diagonal() {
    // X O X / O X O / . . .  with X to move: both 6 and 8 win.
    let board: Board = "XOX/OXO/...".parse().unwrap();
    assert_eq!(board.to_move(), Player::X);
    for seed in 0..10 {
        let decision = engine(seed).decide(&board, Player::X).unwrap();
        assert!([6, 8].contains(&decision.position.to_index()));
        assert_eq!(decision.stage, SelectionStage::ImmediateWin);
    }
}

#[test]
fn test_forced_block() {
    // X . X / . O . / . . .  with O to move: only TopCenter avoids the loss.
    let board: Board = "X.X/.O./...".parse().unwrap();
    let decision = engine(3).decide(&board, Player::O).unwrap();
    assert_eq!(decision.position, Position::TopCenter);
    assert_eq!(decision.stage, SelectionStage::ForcedBlock);
}

#[test]
fn test_win_preferred_over_block() {
    // O can win on the middle row; X also threatens the top row.
    let board: Board = "XX./OO./X..".parse().unwrap();
    assert_eq!(board.to_move(), Player::O);
    let decision = engine(9).decide(&board, Player::O).unwrap();
    assert_eq!(decision.position, Position::MiddleRight);
    assert_eq!(decision.stage, SelectionStage::ImmediateWin);
}

#[test]
fn test_finished_board_is_rejected() {
    let board: Board = "XOX/XOO/OXX".parse().unwrap();
    assert!(evaluate_terminal(&board).is_draw);
    let err = engine(0).choose_move(&board, Player::O).unwrap_err();
    assert!(matches!(err, SelectError::GameOver(_)));
    assert!(err.to_string().contains("over"));
}

fn collect_reachable(board: &mut Board, seen: &mut HashSet<Board>, out: &mut Vec<Board>) {
    if !seen.insert(board.clone()) {
        return;
    }
    if evaluate_terminal(board).is_over() {
        return;
    }
    out.push(board.clone());
    let mover = board.to_move();
    for pos in Position::valid_moves(board) {
        let mut placed = board.place_scoped(pos, mover);
        collect_reachable(&mut placed, seen, out);
    }
}

#[test]
fn test_never_returns_occupied_cell() {
    let mut boards = Vec::new();
    collect_reachable(&mut Board::new(), &mut HashSet::new(), &mut boards);
    // Non-terminal positions reachable in a legal game.
    assert_eq!(boards.len(), 4520);

    let mut engine = Engine::new(
        EngineConfig::default()
            .with_seed(Some(11))
            .with_cache_capacity(100_000),
    );
    for board in &boards {
        let mover = board.to_move();
        let choice = engine.choose_move(board, mover).unwrap();
        assert_eq!(
            board.get(choice),
            Square::Empty,
            "occupied cell {choice} chosen on {}",
            board.key()
        );
    }
}
