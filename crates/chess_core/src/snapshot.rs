use serde::{Deserialize, Serialize};

use crate::{piece::Color, Board, Piece, Position, Result};

/// Serializable state sufficient to resume a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub pieces: Vec<Piece>,
    pub en_passant: Option<Position>,
    pub current_turn: Color,
    #[serde(default)]
    pub captured_white: Vec<Piece>,
    #[serde(default)]
    pub captured_black: Vec<Piece>,
}

impl GameSnapshot {
    pub fn capture(board: &Board, current_turn: Color) -> Self {
        Self {
            pieces: board.pieces().copied().collect(),
            en_passant: board.en_passant_target(),
            current_turn,
            captured_white: board.captured_pieces(Color::White).to_vec(),
            captured_black: board.captured_pieces(Color::Black).to_vec(),
        }
    }

    pub fn to_board(&self) -> Result<Board> {
        Board::from_parts(
            &self.pieces,
            &self.captured_white,
            &self.captured_black,
            self.en_passant,
        )
    }
}
