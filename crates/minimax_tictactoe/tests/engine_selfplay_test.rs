//! Whole games played by the engine.

use minimax_tictactoe::{
    Board, Engine, EngineConfig, GameStatus, Player, Position, Square, evaluate_terminal,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

fn play_out(x: &mut Engine, o: &mut Engine) -> GameStatus {
    let mut board = Board::new();
    loop {
        let status = evaluate_terminal(&board).status();
        if status != GameStatus::InProgress {
            return status;
        }
        let mover = board.to_move();
        let engine = match mover {
            Player::X => &mut *x,
            Player::O => &mut *o,
        };
        let pos = engine.choose_move(&board, mover).unwrap();
        assert!(board.is_empty(pos));
        board.set(pos, Square::Occupied(mover));
    }
}

#[test]
fn test_selfplay_always_draws() {
    for seed in 0..8 {
        let mut x = Engine::new(EngineConfig::default().with_seed(Some(seed)));
        let mut o = Engine::new(EngineConfig::default().with_seed(Some(seed + 100)));
        assert_eq!(play_out(&mut x, &mut o), GameStatus::Draw, "seed {seed}");
    }
}

#[test]
fn test_selfplay_without_opening_book_draws() {
    let config = EngineConfig::default().with_opening_book(false);
    for seed in 0..3 {
        let mut x = Engine::new(config.clone().with_seed(Some(seed)));
        let mut o = Engine::new(config.clone().with_seed(Some(seed + 1)));
        assert_eq!(play_out(&mut x, &mut o), GameStatus::Draw, "seed {seed}");
    }
}

#[test]
fn test_never_loses_to_random_play() {
    for seed in 0..20 {
        for engine_side in [Player::X, Player::O] {
            let mut engine = Engine::new(EngineConfig::default().with_seed(Some(seed)));
            let mut rng = StdRng::seed_from_u64(seed * 31 + 7);
            let mut board = Board::new();

            while !evaluate_terminal(&board).is_over() {
                let mover = board.to_move();
                let pos = if mover == engine_side {
                    engine.choose_move(&board, mover).unwrap()
                } else {
                    let moves = Position::valid_moves(&board);
                    *moves.choose(&mut rng).unwrap()
                };
                board.set(pos, Square::Occupied(mover));
            }

            assert_ne!(
                evaluate_terminal(&board).winner,
                Some(engine_side.opponent()),
                "engine as {engine_side} lost with seed {seed}:\n{}",
                board.display()
            );
        }
    }
}

#[test]
fn test_same_seed_same_game() {
    let record = |seed: u64| {
        let mut engine = Engine::new(EngineConfig::default().with_seed(Some(seed)));
        let mut board = Board::new();
        let mut moves = Vec::new();
        while !evaluate_terminal(&board).is_over() {
            let mover = board.to_move();
            let pos = engine.choose_move(&board, mover).unwrap();
            board.set(pos, Square::Occupied(mover));
            moves.push(pos);
        }
        moves
    };
    assert_eq!(record(5), record(5));
}
