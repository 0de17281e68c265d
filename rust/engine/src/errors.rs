use crate::cards::Color;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Illegal move: card {card_id} is not in {player_id}'s hand")]
    CardNotInHand { player_id: String, card_id: String },
    #[error("Illegal move: {card} cannot be played on {top}")]
    CardNotPlayable { card: String, top: String },
    #[error("A color must be chosen when playing {card}")]
    ColorRequired { card: String },
    #[error("{0} is not a color a Wild card can be resolved to")]
    InvalidColorChoice(Color),
    #[error("Passing is only allowed when no card can be drawn")]
    PassNotAllowed,
    #[error("No cards available to draw")]
    NoCardsAvailable,
    #[error("Game is already over")]
    GameOver,
    #[error("It's not player {actual}'s turn (expected player {expected})")]
    NotPlayersTurn { expected: String, actual: String },
    #[error("Player {0} is already seated")]
    AlreadySeated(String),
    #[error("Game is full ({max} players)")]
    GameFull { max: usize },
    #[error("Invalid table: {count} players with a limit of {max}")]
    InvalidPlayerCount { count: usize, max: usize },
    #[error("Malformed game state: {0}")]
    MalformedState(String),
}

impl GameError {
    /// True for rejections caused by the submitted card itself (not in hand,
    /// not legal, or an unusable color choice).
    pub fn is_illegal_move(&self) -> bool {
        matches!(
            self,
            GameError::CardNotInHand { .. }
                | GameError::CardNotPlayable { .. }
                | GameError::ColorRequired { .. }
                | GameError::InvalidColorChoice(_)
                | GameError::PassNotAllowed
        )
    }
}
