use thiserror::Error;

use crate::{Color, GameStatus, Position};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("no piece at {0}")]
    NoPieceAt(Position),

    #[error("piece reference at {0} is no longer on the board")]
    StalePiece(Position),

    #[error("illegal move {from} -> {to}")]
    IllegalMove { from: Position, to: Position },

    #[error("it is {expected}'s turn")]
    NotYourTurn { expected: Color },

    #[error("game is over ({0:?})")]
    GameOver(GameStatus),

    #[error("no pawn awaiting promotion at {0}")]
    NotPromotable(Position),

    #[error("invalid square '{0}'")]
    InvalidSquare(String),

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("nothing to undo")]
    EmptyHistory,
}

pub type Result<T> = std::result::Result<T, ChessError>;
