// Core chess rules: pieces, board state, turn sequencing
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod moves;
pub mod piece;
pub mod position;
pub mod snapshot;

// Re-export main types for convenience
pub use board::{Board, BoardSnapshot};
pub use config::{Difficulty, GameConfig};
pub use error::{ChessError, Result};
pub use game::{Game, GameStatus, Selection};
pub use moves::{CastleSide, Move, MoveRecord, MoveResult, MoveType};
pub use piece::{Color, Piece, PieceType};
pub use position::Position;
pub use snapshot::GameSnapshot;
