use std::fmt;

use log::{debug, warn};

use crate::{
    error::{ChessError, Result},
    moves::{self, Move, MoveResult, MoveType},
    piece::{Color, PieceType},
    Piece, Position,
};

type Grid = [[Option<Piece>; 8]; 8];

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Fixed-size copy of the board used to roll back exploratory moves.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    squares: Grid,
    captured_lens: [usize; 2],
    en_passant: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: Grid,
    // Indexed by the color of the pieces that were taken.
    captured: [Vec<Piece>; 2],
    en_passant: Option<Position>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_initial_position();
        board
    }

    /// A board with no pieces, for building custom positions.
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
            captured: [Vec::new(), Vec::new()],
            en_passant: None,
        }
    }

    pub fn setup_initial_position(&mut self) {
        *self = Self::empty();

        for x in 0..8 {
            self.place(PieceType::Pawn, Color::Black, Position { x, y: 1 });
            self.place(PieceType::Pawn, Color::White, Position { x, y: 6 });
        }

        for (x, &piece_type) in (0..8).zip(BACK_RANK.iter()) {
            self.place(piece_type, Color::Black, Position { x, y: 0 });
            self.place(piece_type, Color::White, Position { x, y: 7 });
        }
    }

    /// Puts a fresh, unmoved piece on `pos`, replacing whatever was there.
    pub fn place(&mut self, piece_type: PieceType, color: Color, pos: Position) -> Piece {
        let piece = Piece::new(piece_type, color, pos);
        self.set(pos, Some(piece));
        piece
    }

    /// Puts `piece` on the square it names, keeping its `has_moved` flag.
    pub fn put(&mut self, piece: Piece) {
        self.set(piece.position, Some(piece));
    }

    /// Off-board squares are ignored, matching `piece_at`.
    fn set(&mut self, pos: Position, piece: Option<Piece>) {
        if !pos.is_valid() {
            warn!("ignoring placement on off-board square {}", pos);
            return;
        }
        self.squares[pos.x as usize][pos.y as usize] = piece;
    }

    fn take(&mut self, pos: Position) -> Option<Piece> {
        if !pos.is_valid() {
            return None;
        }
        self.squares[pos.x as usize][pos.y as usize].take()
    }

    pub fn is_valid_square(&self, pos: Position) -> bool {
        pos.is_valid()
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        if !pos.is_valid() {
            return None;
        }
        self.squares[pos.x as usize][pos.y as usize].as_ref()
    }

    /// False for off-board squares as well as occupied ones.
    pub fn is_empty(&self, pos: Position) -> bool {
        pos.is_valid() && self.piece_at(pos).is_none()
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.squares.iter().flatten().flatten()
    }

    pub fn pieces_of(&self, color: Color) -> Vec<Piece> {
        self.pieces().filter(|p| p.color == color).copied().collect()
    }

    pub fn king_of(&self, color: Color) -> Option<Piece> {
        self.pieces()
            .find(|p| p.piece_type == PieceType::King && p.color == color)
            .copied()
    }

    pub fn en_passant_target(&self) -> Option<Position> {
        self.en_passant
    }

    /// Pieces of `color` that have been taken, in capture order.
    pub fn captured_pieces(&self, color: Color) -> &[Piece] {
        &self.captured[color.index()]
    }

    pub fn is_attacked(&self, square: Position, by: Color) -> bool {
        self.pieces()
            .filter(|p| p.color == by)
            .any(|p| moves::attacks(p, square, self))
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_of(color) {
            Some(king) => self.is_attacked(king.position, color.opposite()),
            None => false,
        }
    }

    /// Whether moving `piece` to `target` would leave its own king attacked.
    ///
    /// The move is played out on a private copy of the grid, so the live board
    /// is never observed in an intermediate state. A piece that is no longer
    /// on the board is reported as exposing, which keeps it out of every
    /// legal-move list.
    pub fn would_expose_check(&self, piece: &Piece, target: Position) -> bool {
        if self.piece_at(piece.position) != Some(piece) || !target.is_valid() {
            return true;
        }

        let mut scratch = Board {
            squares: self.squares,
            captured: Default::default(),
            en_passant: self.en_passant,
        };

        if self.is_en_passant_capture(piece, target) {
            scratch.set(Position { x: target.x, y: piece.position.y }, None);
        }

        let mut moved = *piece;
        scratch.set(piece.position, None);
        moved.position = target;
        scratch.set(target, Some(moved));

        let king_square = if piece.piece_type == PieceType::King {
            target
        } else {
            match scratch.king_of(piece.color) {
                Some(king) => king.position,
                None => return false,
            }
        };

        scratch.is_attacked(king_square, piece.color.opposite())
    }

    fn is_en_passant_capture(&self, piece: &Piece, target: Position) -> bool {
        piece.piece_type == PieceType::Pawn
            && target.x != piece.position.x
            && self.en_passant == Some(target)
            && self.piece_at(target).is_none()
    }

    /// Pseudo-legal moves of whatever stands on `pos`; empty for an empty or
    /// off-board square.
    pub fn pseudo_legal_moves(&self, pos: Position) -> Vec<Move> {
        match self.piece_at(pos) {
            Some(piece) => moves::pseudo_legal_moves(piece, self),
            None => Vec::new(),
        }
    }

    pub fn legal_moves(&self, pos: Position) -> Vec<Move> {
        let Some(piece) = self.piece_at(pos) else {
            return Vec::new();
        };

        moves::pseudo_legal_moves(piece, self)
            .into_iter()
            .filter(|m| !self.would_expose_check(piece, m.to))
            .collect()
    }

    pub fn legal_moves_for(&self, color: Color) -> Vec<Move> {
        self.pieces_of(color)
            .iter()
            .flat_map(|p| self.legal_moves(p.position))
            .collect()
    }

    pub fn has_legal_move(&self, color: Color) -> bool {
        self.pieces_of(color).iter().any(|piece| {
            moves::pseudo_legal_moves(piece, self)
                .iter()
                .any(|m| !self.would_expose_check(piece, m.to))
        })
    }

    /// Moves `piece` to `target`.
    ///
    /// Full legality is the caller's job, but the request must at least be one
    /// of the piece's pseudo-legal moves; anything else is rejected before the
    /// board is touched.
    pub fn apply_move(&mut self, piece: &Piece, target: Position) -> Result<MoveResult> {
        match self.piece_at(piece.position) {
            Some(current) if current == piece => {}
            Some(_) => return Err(ChessError::StalePiece(piece.position)),
            None => return Err(ChessError::NoPieceAt(piece.position)),
        }

        let candidate = moves::pseudo_legal_moves(piece, self)
            .into_iter()
            .find(|m| m.to == target);

        match candidate {
            Some(mv) => Ok(self.execute(*piece, mv)),
            None => {
                warn!("rejected {:?} {} -> {}", piece.piece_type, piece.position, target);
                Err(ChessError::IllegalMove {
                    from: piece.position,
                    to: target,
                })
            }
        }
    }

    /// Convenience form of `apply_move` addressed by squares.
    pub fn apply_move_at(&mut self, from: Position, to: Position) -> Result<MoveResult> {
        let piece = *self.piece_at(from).ok_or(ChessError::NoPieceAt(from))?;
        self.apply_move(&piece, to)
    }

    fn execute(&mut self, piece: Piece, mv: Move) -> MoveResult {
        let mut result = MoveResult {
            piece,
            from: mv.from,
            to: mv.to,
            captured: None,
            is_castling: false,
            is_en_passant: false,
            is_promotion: false,
            castle_side: None,
            promoted_to: None,
            previous_en_passant: self.en_passant,
        };

        self.en_passant = None;

        if let MoveType::Castle(side) = mv.move_type {
            result.is_castling = true;
            result.castle_side = Some(side);

            let mut king = piece;
            self.set(mv.from, None);
            king.move_to(mv.to);
            self.put(king);

            let (rook_file, rook_target) = side.rook_files();
            let row = mv.from.y;
            if let Some(mut rook) = self.take(Position { x: rook_file, y: row }) {
                rook.move_to(Position { x: rook_target, y: row });
                self.put(rook);
            }

            debug!("{} castles {:?}", piece.color, side);
            return result;
        }

        if mv.move_type == MoveType::EnPassant {
            result.is_en_passant = true;
            let victim_square = Position { x: mv.to.x, y: mv.from.y };
            if let Some(victim) = self.take(victim_square) {
                self.captured[victim.color.index()].push(victim);
                result.captured = Some(victim);
            }
        }

        if let Some(occupant) = self.take(mv.to) {
            self.captured[occupant.color.index()].push(occupant);
            result.captured = Some(occupant);
        }

        if piece.piece_type == PieceType::Pawn && (mv.to.y as i8 - mv.from.y as i8).abs() == 2 {
            self.en_passant = mv.from.offset(0, piece.color.pawn_direction());
        }

        let mut moved = piece;
        self.set(mv.from, None);
        moved.move_to(mv.to);
        self.put(moved);

        if piece.piece_type == PieceType::Pawn && mv.to.y == piece.color.promotion_row() {
            result.is_promotion = true;
        }

        debug!(
            "{} {:?} {} -> {}{}",
            piece.color,
            piece.piece_type,
            mv.from,
            mv.to,
            result.captured.map_or(String::new(), |c| format!(" x{:?}", c.piece_type))
        );

        result
    }

    /// Replaces the pawn on `pos` with a piece of `kind` (queen when `kind` is
    /// missing or not a legal promotion).
    pub fn promote(&mut self, pos: Position, kind: Option<PieceType>) -> Result<Piece> {
        let pawn = match self.piece_at(pos) {
            Some(p) if p.piece_type == PieceType::Pawn && pos.y == p.color.promotion_row() => *p,
            _ => return Err(ChessError::NotPromotable(pos)),
        };

        let promoted = Piece {
            piece_type: PieceType::promotion_target(kind),
            color: pawn.color,
            position: pos,
            has_moved: true,
        };
        self.put(promoted);
        debug!("{} pawn on {} promoted to {:?}", pawn.color, pos, promoted.piece_type);
        Ok(promoted)
    }

    /// Reverses a move previously returned by `apply_move` (promotion
    /// included). It must be the most recent move on this board.
    pub fn undo_move(&mut self, result: &MoveResult) -> Result<()> {
        match self.piece_at(result.to) {
            Some(p) if p.color == result.piece.color => {}
            _ => {
                return Err(ChessError::IllegalMove {
                    from: result.to,
                    to: result.from,
                })
            }
        }

        if let Some(side) = result.castle_side {
            let (rook_file, rook_target) = side.rook_files();
            let row = result.from.y;
            if let Some(mut rook) = self.take(Position { x: rook_target, y: row }) {
                rook.position = Position { x: rook_file, y: row };
                rook.has_moved = false;
                self.put(rook);
            }
        }

        self.set(result.to, None);
        self.put(result.piece);

        if let Some(captured) = result.captured {
            self.captured[captured.color.index()].pop();
            self.put(captured);
        }

        self.en_passant = result.previous_en_passant;
        Ok(())
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            squares: self.squares,
            captured_lens: [self.captured[0].len(), self.captured[1].len()],
            en_passant: self.en_passant,
        }
    }

    /// Rolls back to `snapshot`. Capture lists only grow between a snapshot
    /// and its restore, so truncating them is enough.
    pub fn restore(&mut self, snapshot: &BoardSnapshot) {
        self.squares = snapshot.squares;
        for (list, &len) in self.captured.iter_mut().zip(snapshot.captured_lens.iter()) {
            list.truncate(len);
        }
        self.en_passant = snapshot.en_passant;
    }

    /// Fails unless each side has exactly one king.
    pub fn validate_kings(&self) -> Result<()> {
        for color in [Color::White, Color::Black] {
            let kings = self
                .pieces()
                .filter(|p| p.color == color && p.piece_type == PieceType::King)
                .count();
            if kings != 1 {
                return Err(ChessError::InvalidPosition(format!(
                    "{} has {} kings",
                    color, kings
                )));
            }
        }
        Ok(())
    }

    /// Builds a board from an explicit piece list, checking the invariants a
    /// live game relies on.
    pub fn from_parts(
        pieces: &[Piece],
        captured_white: &[Piece],
        captured_black: &[Piece],
        en_passant: Option<Position>,
    ) -> Result<Self> {
        let mut board = Self::empty();

        for piece in pieces {
            if !piece.position.is_valid() {
                return Err(ChessError::InvalidPosition(format!(
                    "{:?} off the board",
                    piece.position
                )));
            }
            if board.piece_at(piece.position).is_some() {
                return Err(ChessError::InvalidPosition(format!(
                    "two pieces on {}",
                    piece.position
                )));
            }
            board.put(*piece);
        }

        board.validate_kings()?;

        if let Some(target) = en_passant {
            if !target.is_valid() {
                return Err(ChessError::InvalidPosition(format!(
                    "en passant target {:?} off the board",
                    target
                )));
            }
        }

        board.captured = [captured_white.to_vec(), captured_black.to_vec()];
        board.en_passant = en_passant;
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..8u8 {
            write!(f, "{} ", 8 - y)?;
            for x in 0..8u8 {
                let c = self.piece_at(Position { x, y }).map_or('.', |p| p.symbol());
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "  abcdefgh")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Position {
        Position::from_algebraic(name).unwrap()
    }

    #[test]
    fn initial_position_layout() {
        let board = Board::new();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.king_of(Color::White).unwrap().position, sq("e1"));
        assert_eq!(board.king_of(Color::Black).unwrap().position, sq("e8"));
        assert_eq!(board.piece_at(sq("d1")).unwrap().piece_type, PieceType::Queen);
        assert_eq!(board.legal_moves_for(Color::White).len(), 20);
        assert_eq!(board.legal_moves_for(Color::Black).len(), 20);
    }

    #[test]
    fn off_board_queries_degrade() {
        let board = Board::new();
        let outside = Position { x: 9, y: 2 };
        assert!(!board.is_valid_square(outside));
        assert!(board.piece_at(outside).is_none());
        assert!(!board.is_empty(outside));
        assert!(board.pseudo_legal_moves(outside).is_empty());
    }

    #[test]
    fn off_board_placement_is_ignored() {
        let mut board = Board::empty();
        board.put(Piece::new(PieceType::Rook, Color::White, Position { x: 8, y: 0 }));
        board.place(PieceType::Queen, Color::Black, Position { x: 0, y: 200 });
        assert_eq!(board, Board::empty());
    }

    #[test]
    fn standard_capture_fills_capture_list() {
        let mut board = Board::empty();
        board.place(PieceType::King, Color::White, sq("e1"));
        board.place(PieceType::King, Color::Black, sq("e8"));
        board.place(PieceType::Rook, Color::White, sq("a1"));
        board.place(PieceType::Knight, Color::Black, sq("a6"));

        let result = board.apply_move_at(sq("a1"), sq("a6")).unwrap();
        assert_eq!(result.captured.map(|p| p.piece_type), Some(PieceType::Knight));
        assert_eq!(board.captured_pieces(Color::Black).len(), 1);
        assert!(board.captured_pieces(Color::White).is_empty());
        assert_eq!(board.piece_at(sq("a6")).unwrap().piece_type, PieceType::Rook);
        assert!(board.piece_at(sq("a6")).unwrap().has_moved);
    }

    #[test]
    fn illegal_request_leaves_board_untouched() {
        let mut board = Board::new();
        let before = board.clone();
        let err = board.apply_move_at(sq("e2"), sq("e5")).unwrap_err();
        assert_eq!(err, ChessError::IllegalMove { from: sq("e2"), to: sq("e5") });
        assert_eq!(board, before);

        assert_eq!(
            board.apply_move_at(sq("e4"), sq("e5")).unwrap_err(),
            ChessError::NoPieceAt(sq("e4"))
        );
    }

    #[test]
    fn stale_piece_reference_is_rejected() {
        let mut board = Board::new();
        let pawn = *board.piece_at(sq("e2")).unwrap();
        board.apply_move(&pawn, sq("e4")).unwrap();

        let err = board.apply_move(&pawn, sq("e3")).unwrap_err();
        assert_eq!(err, ChessError::NoPieceAt(sq("e2")));
        assert!(board.would_expose_check(&pawn, sq("e3")));
    }

    #[test]
    fn en_passant_target_lives_one_ply() {
        let mut board = Board::new();
        board.apply_move_at(sq("e2"), sq("e4")).unwrap();
        assert_eq!(board.en_passant_target(), Some(sq("e3")));

        board.apply_move_at(sq("g8"), sq("f6")).unwrap();
        assert_eq!(board.en_passant_target(), None);
    }

    #[test]
    fn promotion_flag_and_swap() {
        let mut board = Board::empty();
        board.place(PieceType::King, Color::White, sq("e1"));
        board.place(PieceType::King, Color::Black, sq("h8"));
        board.place(PieceType::Pawn, Color::White, sq("b7"));

        let result = board.apply_move_at(sq("b7"), sq("b8")).unwrap();
        assert!(result.is_promotion);

        let knight = board.promote(sq("b8"), Some(PieceType::Knight)).unwrap();
        assert_eq!(knight.piece_type, PieceType::Knight);
        assert!(knight.has_moved);

        assert_eq!(
            board.promote(sq("e1"), None).unwrap_err(),
            ChessError::NotPromotable(sq("e1"))
        );
    }

    #[test]
    fn invalid_promotion_kind_becomes_queen() {
        let mut board = Board::empty();
        board.place(PieceType::King, Color::White, sq("e1"));
        board.place(PieceType::King, Color::Black, sq("h8"));
        board.place(PieceType::Pawn, Color::Black, sq("c2"));
        board.apply_move_at(sq("c2"), sq("c1")).unwrap();

        let queen = board.promote(sq("c1"), Some(PieceType::King)).unwrap();
        assert_eq!(queen.piece_type, PieceType::Queen);
        assert_eq!(board.king_of(Color::Black).unwrap().position, sq("h8"));
    }

    #[test]
    fn snapshot_restore_rolls_back_capture() {
        let mut board = Board::new();
        board.apply_move_at(sq("e2"), sq("e4")).unwrap();
        board.apply_move_at(sq("d7"), sq("d5")).unwrap();
        let before = board.clone();
        let snapshot = board.snapshot();

        board.apply_move_at(sq("e4"), sq("d5")).unwrap();
        assert_eq!(board.captured_pieces(Color::Black).len(), 1);

        board.restore(&snapshot);
        assert_eq!(board, before);
    }

    #[test]
    fn from_parts_requires_one_king_each() {
        let king = Piece::new(PieceType::King, Color::White, sq("e1"));
        let err = Board::from_parts(&[king], &[], &[], None).unwrap_err();
        assert!(matches!(err, ChessError::InvalidPosition(_)));

        let black = Piece::new(PieceType::King, Color::Black, sq("e8"));
        let board = Board::from_parts(&[king, black], &[], &[], None).unwrap();
        assert_eq!(board.pieces().count(), 2);

        let second = Piece::new(PieceType::King, Color::Black, sq("a8"));
        let err = Board::from_parts(&[king, black, second], &[], &[], None).unwrap_err();
        assert_eq!(err, ChessError::InvalidPosition("black has 2 kings".to_string()));
    }

    #[test]
    fn display_draws_white_at_bottom() {
        let text = Board::new().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8 rnbqkbnr");
        assert_eq!(lines[7], "1 RNBQKBNR");
    }
}
