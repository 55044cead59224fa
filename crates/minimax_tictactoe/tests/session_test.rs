//! Tests for game sessions against the computer.

use minimax_tictactoe::{
    Engine, EngineConfig, GameMode, GameSession, GameStatus, MoveError, Player, Position,
};

fn against_computer(computer: Player, seed: u64) -> GameSession {
    GameSession::new(
        GameMode::SinglePlayer { computer },
        Engine::new(EngineConfig::default().with_seed(Some(seed))),
    )
}

#[test]
fn test_computer_opens_in_center() {
    let mut session = against_computer(Player::X, 1);
    assert!(session.is_computer_turn());
    assert_eq!(session.play_computer().unwrap(), Position::Center);
    assert_eq!(session.to_move(), Player::O);
    assert!(!session.is_computer_turn());
}

#[test]
fn test_naive_human_never_beats_computer() {
    let mut session = against_computer(Player::O, 4);
    // The human always takes the first free cell.
    while session.status() == GameStatus::InProgress {
        if session.is_computer_turn() {
            session.play_computer().unwrap();
        } else {
            let pos = Position::valid_moves(session.board())[0];
            session.play(pos).unwrap();
        }
    }

    assert_ne!(session.status(), GameStatus::Won(Player::X));
    assert_eq!(session.scores().total(), 1);
    // The cache is dropped once the game is decided.
    assert!(session.engine().searcher().cache().is_empty());
}

#[test]
fn test_play_after_game_over_is_rejected() {
    let mut session = GameSession::new(GameMode::TwoPlayer, Engine::default());
    for pos in [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomRight,
    ] {
        session.play(pos).unwrap();
    }
    assert_eq!(session.status(), GameStatus::Won(Player::X));
    assert_eq!(
        session.winning_line(),
        Some([Position::TopLeft, Position::Center, Position::BottomRight])
    );
    assert_eq!(session.play(Position::TopRight), Err(MoveError::GameOver));

    session.new_game();
    assert_eq!(session.status(), GameStatus::InProgress);
    assert_eq!(*session.scores().x_wins(), 1);
}

#[test]
fn test_history_serializes() {
    let mut session = GameSession::new(GameMode::TwoPlayer, Engine::default());
    session.play(Position::Center).unwrap();
    let json = serde_json::to_string(session.history()).unwrap();
    assert!(json.contains("Center"));
}
