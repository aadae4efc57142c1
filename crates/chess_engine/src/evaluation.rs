use chess_core::{piece::{Color, PieceType}, Board, Move, Position};
use log::debug;

// Material values in pawns
const PAWN_VALUE: f64 = 1.0;
const KNIGHT_VALUE: f64 = 3.0;
const BISHOP_VALUE: f64 = 3.0;
const ROOK_VALUE: f64 = 5.0;
const QUEEN_VALUE: f64 = 9.0;
const KING_VALUE: f64 = 100.0;

// Move bonuses
const CAPTURE_MULTIPLIER: f64 = 10.0;
const CHECK_BONUS: f64 = 5.0;
const CHECKMATE_BONUS: f64 = 1000.0;
const PROMOTION_BONUS: f64 = 8.0;
const CASTLING_BONUS: f64 = 3.0;
const CENTER_BONUS: f64 = 0.5;        // central 4x4
const INNER_CENTER_BONUS: f64 = 0.5;  // extra for the central 2x2

/// Upper bound of the random tie-break added on top of `score_move`.
pub const MAX_JITTER: f64 = 0.2;

/// Returns the material value of a piece
pub fn piece_value(piece_type: PieceType) -> f64 {
    match piece_type {
        PieceType::Pawn => PAWN_VALUE,
        PieceType::Knight => KNIGHT_VALUE,
        PieceType::Bishop => BISHOP_VALUE,
        PieceType::Rook => ROOK_VALUE,
        PieceType::Queen => QUEEN_VALUE,
        PieceType::King => KING_VALUE,
    }
}

fn center_bonus(to: Position) -> f64 {
    let mut bonus = 0.0;
    if (2..=5).contains(&to.x) && (2..=5).contains(&to.y) {
        bonus += CENTER_BONUS;
        if (3..=4).contains(&to.x) && (3..=4).contains(&to.y) {
            bonus += INNER_CENTER_BONUS;
        }
    }
    bonus
}

/// Scores `mv` for `side` by playing it on `board` and rolling it back.
///
/// `board` must be a scratch copy; it is restored before returning but is
/// mutated in between. A move the board refuses scores negative infinity.
pub fn score_move(board: &mut Board, mv: &Move, side: Color) -> f64 {
    let snapshot = board.snapshot();

    let result = match board.apply_move_at(mv.from, mv.to) {
        Ok(result) => result,
        Err(_) => {
            board.restore(&snapshot);
            return f64::NEG_INFINITY;
        }
    };

    // The controller promotes the search's pawns to queens, so check and
    // mate are judged with the queen on the board.
    if result.is_promotion {
        if let Err(err) = board.promote(mv.to, Some(PieceType::Queen)) {
            debug!("scoring {} -> {} without promotion: {}", mv.from, mv.to, err);
        }
    }

    let mut score = 0.0;

    if let Some(captured) = result.captured {
        score += piece_value(captured.piece_type) * CAPTURE_MULTIPLIER;
    }

    let opponent = side.opposite();
    if board.is_in_check(opponent) {
        score += CHECK_BONUS;
        if !board.has_legal_move(opponent) {
            score += CHECKMATE_BONUS;
        }
    }

    if result.is_promotion {
        score += PROMOTION_BONUS;
    }

    if result.is_castling {
        score += CASTLING_BONUS;
    }

    score += center_bonus(mv.to);

    board.restore(&snapshot);
    score
}
