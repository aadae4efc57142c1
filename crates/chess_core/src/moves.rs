use serde::{Deserialize, Serialize};

use crate::{piece::{Color, PieceType}, Board, Piece, Position};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2),
    (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0), (1, 1), (0, 1), (-1, 1),
    (-1, 0), (-1, -1), (0, -1), (1, -1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const KING_HOME_FILE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// File the king lands on.
    pub fn king_target_file(self) -> u8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }

    /// (rook home file, rook destination file)
    pub fn rook_files(self) -> (u8, u8) {
        match self {
            CastleSide::Kingside => (7, 5),
            CastleSide::Queenside => (0, 3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveType {
    Normal,
    Capture,
    EnPassant,
    Castle(CastleSide),
}

/// A candidate move produced by the generators. Promotion is not part of the
/// candidate; the pawn is swapped out afterwards by `Board::promote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub move_type: MoveType,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            move_type: MoveType::Normal,
        }
    }

    pub fn capture(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            move_type: MoveType::Capture,
        }
    }

    pub fn castle(from: Position, side: CastleSide) -> Self {
        Self {
            from,
            to: Position { x: side.king_target_file(), y: from.y },
            move_type: MoveType::Castle(side),
        }
    }

    pub fn castle_side(&self) -> Option<CastleSide> {
        match self.move_type {
            MoveType::Castle(side) => Some(side),
            _ => None,
        }
    }
}

/// What `Board::apply_move` did. Carries enough to undo the move exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    /// The mover as it stood before the move.
    pub piece: Piece,
    pub from: Position,
    pub to: Position,
    /// The captured piece with the square it was taken on.
    pub captured: Option<Piece>,
    pub is_castling: bool,
    pub is_en_passant: bool,
    pub is_promotion: bool,
    pub castle_side: Option<CastleSide>,
    pub promoted_to: Option<PieceType>,
    pub previous_en_passant: Option<Position>,
}

/// The replayable form of an applied move, as sent to a remote peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PieceType>,
    pub is_capture: bool,
    pub is_castling: bool,
    pub is_en_passant: bool,
    pub is_promotion: bool,
}

impl From<&MoveResult> for MoveRecord {
    fn from(result: &MoveResult) -> Self {
        Self {
            from: result.from,
            to: result.to,
            promotion: result.promoted_to,
            is_capture: result.captured.is_some(),
            is_castling: result.is_castling,
            is_en_passant: result.is_en_passant,
            is_promotion: result.is_promotion,
        }
    }
}

/// Pseudo-legal moves for `piece`: board geometry, blocking and capture rules,
/// without the generic own-king safety filter. Kings are the exception and
/// already exclude attacked destinations.
pub fn pseudo_legal_moves(piece: &Piece, board: &Board) -> Vec<Move> {
    match piece.piece_type {
        PieceType::Pawn => pawn_moves(piece, board),
        PieceType::Knight => step_moves(piece, board, &KNIGHT_OFFSETS),
        PieceType::Bishop => sliding_moves(piece, board, &BISHOP_DIRECTIONS),
        PieceType::Rook => sliding_moves(piece, board, &ROOK_DIRECTIONS),
        PieceType::Queen => {
            let mut moves = sliding_moves(piece, board, &ROOK_DIRECTIONS);
            moves.extend(sliding_moves(piece, board, &BISHOP_DIRECTIONS));
            moves
        }
        PieceType::King => king_moves(piece, board),
    }
}

/// Whether `piece` attacks `target`. Kings and pawns are answered from their
/// capture geometry so this never calls back into king move generation.
pub fn attacks(piece: &Piece, target: Position, board: &Board) -> bool {
    let dx = target.x as i8 - piece.position.x as i8;
    let dy = target.y as i8 - piece.position.y as i8;
    match piece.piece_type {
        PieceType::King => dx.abs() <= 1 && dy.abs() <= 1 && (dx, dy) != (0, 0),
        PieceType::Pawn => dx.abs() == 1 && dy == piece.color.pawn_direction(),
        PieceType::Knight => KNIGHT_OFFSETS.contains(&(dx, dy)),
        _ => pseudo_legal_moves(piece, board).iter().any(|m| m.to == target),
    }
}

/// Row an en-passant target must sit on for a pawn of `capturer` to take it:
/// the square the opponent's double step skipped.
fn en_passant_row(capturer: Color) -> u8 {
    let opponent = capturer.opposite();
    let start_row = opponent.home_row() as i8 + opponent.pawn_direction();
    (start_row + opponent.pawn_direction()) as u8
}

fn pawn_moves(piece: &Piece, board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    let from = piece.position;
    let direction = piece.color.pawn_direction();

    if let Some(one) = from.offset(0, direction) {
        if board.is_empty(one) {
            moves.push(Move::new(from, one));

            if !piece.has_moved {
                if let Some(two) = from.offset(0, 2 * direction) {
                    if board.is_empty(two) {
                        moves.push(Move::new(from, two));
                    }
                }
            }
        }
    }

    for dx in [-1, 1] {
        let Some(target) = from.offset(dx, direction) else {
            continue;
        };

        match board.piece_at(target) {
            Some(occupant) if occupant.color != piece.color => {
                moves.push(Move::capture(from, target));
            }
            Some(_) => {}
            None => {
                if board.en_passant_target() == Some(target) && target.y == en_passant_row(piece.color) {
                    let victim = board.piece_at(Position { x: target.x, y: from.y });
                    let takeable = victim.map_or(false, |v| {
                        v.piece_type == PieceType::Pawn && v.color != piece.color
                    });
                    if takeable {
                        moves.push(Move {
                            from,
                            to: target,
                            move_type: MoveType::EnPassant,
                        });
                    }
                }
            }
        }
    }

    moves
}

fn step_moves(piece: &Piece, board: &Board, offsets: &[(i8, i8)]) -> Vec<Move> {
    offsets
        .iter()
        .filter_map(|&(dx, dy)| piece.position.offset(dx, dy))
        .filter_map(|target| match board.piece_at(target) {
            None => Some(Move::new(piece.position, target)),
            Some(occupant) if occupant.color != piece.color => Some(Move::capture(piece.position, target)),
            Some(_) => None,
        })
        .collect()
}

fn sliding_moves(piece: &Piece, board: &Board, directions: &[(i8, i8)]) -> Vec<Move> {
    let mut moves = Vec::new();

    for &(dx, dy) in directions {
        let mut current = piece.position.offset(dx, dy);
        while let Some(target) = current {
            match board.piece_at(target) {
                None => moves.push(Move::new(piece.position, target)),
                Some(occupant) => {
                    if occupant.color != piece.color {
                        moves.push(Move::capture(piece.position, target));
                    }
                    break;
                }
            }
            current = target.offset(dx, dy);
        }
    }

    moves
}

fn king_moves(piece: &Piece, board: &Board) -> Vec<Move> {
    let mut moves: Vec<Move> = step_moves(piece, board, &KING_OFFSETS)
        .into_iter()
        .filter(|m| !board.would_expose_check(piece, m.to))
        .collect();

    for side in [CastleSide::Kingside, CastleSide::Queenside] {
        if can_castle(piece, board, side) {
            moves.push(Move::castle(piece.position, side));
        }
    }

    moves
}

fn can_castle(king: &Piece, board: &Board, side: CastleSide) -> bool {
    let row = king.color.home_row();
    if king.has_moved || king.position != (Position { x: KING_HOME_FILE, y: row }) {
        return false;
    }

    let enemy = king.color.opposite();
    if board.is_attacked(king.position, enemy) {
        return false;
    }

    let (rook_file, _) = side.rook_files();
    let rook_ok = board.piece_at(Position { x: rook_file, y: row }).map_or(false, |rook| {
        rook.piece_type == PieceType::Rook && rook.color == king.color && !rook.has_moved
    });
    if !rook_ok {
        return false;
    }

    // Queenside only requires the c and d files to be safe; b just has to be empty.
    let (must_be_empty, must_be_safe): (&[u8], &[u8]) = match side {
        CastleSide::Kingside => (&[5, 6], &[5, 6]),
        CastleSide::Queenside => (&[1, 2, 3], &[2, 3]),
    };

    must_be_empty.iter().all(|&x| board.is_empty(Position { x, y: row }))
        && must_be_safe.iter().all(|&x| !board.is_attacked(Position { x, y: row }, enemy))
}
