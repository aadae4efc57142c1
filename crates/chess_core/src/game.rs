use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    config::GameConfig,
    error::{ChessError, Result},
    moves::{MoveRecord, MoveResult},
    piece::{Color, PieceType},
    snapshot::GameSnapshot,
    Board, Position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    /// Status of `side`, the side about to move on `board`.
    pub fn evaluate(board: &Board, side: Color) -> Self {
        let in_check = board.is_in_check(side);
        let has_legal_move = board.has_legal_move(side);

        match (in_check, has_legal_move) {
            (true, false) => GameStatus::Checkmate,
            (false, false) => GameStatus::Stalemate,
            (true, true) => GameStatus::Check,
            (false, true) => GameStatus::Active,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

/// Outcome of a square selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Selected(Position),
    Switched(Position),
    Deselected,
    Moved(MoveResult),
    Ignored,
}

/// Owns the live board and sequences turns over it.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    current_turn: Color,
    status: GameStatus,
    history: Vec<MoveResult>,
    selected: Option<Position>,
    config: GameConfig,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self::with_board(Board::new(), config.first_to_move, config)
    }

    /// Starts from an arbitrary position with `to_move` on turn. The board
    /// must hold exactly one king per side.
    pub fn from_board(board: Board, to_move: Color, config: GameConfig) -> Result<Self> {
        board.validate_kings()?;
        Ok(Self::with_board(board, to_move, config))
    }

    fn with_board(board: Board, to_move: Color, config: GameConfig) -> Self {
        let status = GameStatus::evaluate(&board, to_move);
        Self {
            board,
            current_turn: to_move,
            status,
            history: Vec::new(),
            selected: None,
            config,
        }
    }

    pub fn from_snapshot(snapshot: &GameSnapshot, config: GameConfig) -> Result<Self> {
        let board = snapshot.to_board()?;
        Ok(Self::with_board(board, snapshot.current_turn, config))
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.board, self.current_turn)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn history(&self) -> &[MoveResult] {
        &self.history
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GameConfig) {
        self.config = config;
    }

    /// Whether the automated side should move now.
    pub fn is_ai_turn(&self) -> bool {
        self.config.ai_side == Some(self.current_turn) && !self.status.is_terminal()
    }

    /// Legal destinations of the piece on `pos`, for highlighting.
    pub fn legal_destinations(&self, pos: Position) -> Vec<Position> {
        self.board.legal_moves(pos).into_iter().map(|m| m.to).collect()
    }

    pub fn is_legal_move(&self, from: Position, to: Position) -> bool {
        match self.board.piece_at(from) {
            Some(piece) if piece.color == self.current_turn => {
                self.board.legal_moves(from).iter().any(|m| m.to == to)
            }
            _ => false,
        }
    }

    /// Click-style interaction: select a piece, then a destination.
    pub fn select_square(&mut self, pos: Position) -> Result<Selection> {
        if self.status.is_terminal() {
            return Ok(Selection::Ignored);
        }

        let clicked_own = self
            .board
            .piece_at(pos)
            .map_or(false, |p| p.color == self.current_turn);

        let Some(selected) = self.selected else {
            if clicked_own {
                self.selected = Some(pos);
                return Ok(Selection::Selected(pos));
            }
            return Ok(Selection::Ignored);
        };

        if selected == pos {
            self.selected = None;
            return Ok(Selection::Deselected);
        }

        if clicked_own {
            self.selected = Some(pos);
            return Ok(Selection::Switched(pos));
        }

        if self.is_legal_move(selected, pos) {
            return self.make_move(selected, pos).map(Selection::Moved);
        }

        Ok(Selection::Ignored)
    }

    pub fn make_move(&mut self, from: Position, to: Position) -> Result<MoveResult> {
        self.make_move_with_promotion(from, to, None)
    }

    /// Applies a legal move for the side on turn. A pawn reaching the last
    /// rank becomes `promotion` (queen by default).
    pub fn make_move_with_promotion(
        &mut self,
        from: Position,
        to: Position,
        promotion: Option<PieceType>,
    ) -> Result<MoveResult> {
        if self.status.is_terminal() {
            return Err(ChessError::GameOver(self.status));
        }
        if let Some(off) = [from, to].into_iter().find(|p| !p.is_valid()) {
            return Err(ChessError::InvalidSquare(off.to_string()));
        }

        let piece = *self.board.piece_at(from).ok_or(ChessError::NoPieceAt(from))?;
        if piece.color != self.current_turn {
            return Err(ChessError::NotYourTurn {
                expected: self.current_turn,
            });
        }

        if !self.is_legal_move(from, to) {
            warn!("{} tried illegal move {} -> {}", self.current_turn, from, to);
            return Err(ChessError::IllegalMove { from, to });
        }

        let mut result = self.board.apply_move(&piece, to)?;
        if result.is_promotion {
            let promoted = self.board.promote(to, promotion)?;
            result.promoted_to = Some(promoted.piece_type);
        }

        self.history.push(result);
        self.selected = None;
        self.current_turn = self.current_turn.opposite();
        self.update_status();

        Ok(result)
    }

    /// Replays a move received from a remote peer. The record's flags must
    /// match what the move does here, otherwise it is rolled back.
    pub fn apply_record(&mut self, record: &MoveRecord) -> Result<MoveResult> {
        let result = self.make_move_with_promotion(record.from, record.to, record.promotion)?;

        if MoveRecord::from(&result) != *record {
            warn!("record {:?} diverged from local result {:?}", record, result);
            self.undo()?;
            return Err(ChessError::IllegalMove {
                from: record.from,
                to: record.to,
            });
        }

        Ok(result)
    }

    /// Takes back the last move.
    pub fn undo(&mut self) -> Result<MoveResult> {
        let last = self.history.pop().ok_or(ChessError::EmptyHistory)?;

        if let Err(err) = self.board.undo_move(&last) {
            self.history.push(last);
            return Err(err);
        }

        self.current_turn = last.piece.color;
        self.selected = None;
        self.update_status();
        Ok(last)
    }

    /// Back to the initial position, keeping the configuration.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
        debug!("game reset, {} to move", self.current_turn);
    }

    fn update_status(&mut self) {
        let previous = self.status;
        self.status = GameStatus::evaluate(&self.board, self.current_turn);

        if self.status != previous {
            match self.status {
                GameStatus::Checkmate => info!("checkmate, {} wins", self.current_turn.opposite()),
                GameStatus::Stalemate => info!("stalemate"),
                GameStatus::Check => info!("{} is in check", self.current_turn),
                GameStatus::Active => debug!("{} to move", self.current_turn),
            }
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Position {
        Position::from_algebraic(name).unwrap()
    }

    #[test]
    fn turns_alternate_and_history_grows() {
        let mut game = Game::new(GameConfig::human_vs_human());
        assert_eq!(game.current_turn(), Color::White);
        assert_eq!(game.status(), GameStatus::Active);

        game.make_move(sq("e2"), sq("e4")).unwrap();
        assert_eq!(game.current_turn(), Color::Black);
        game.make_move(sq("e7"), sq("e5")).unwrap();
        assert_eq!(game.current_turn(), Color::White);
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.history()[0].from, sq("e2"));
    }

    #[test]
    fn wrong_side_cannot_move() {
        let mut game = Game::new(GameConfig::human_vs_human());
        let err = game.make_move(sq("e7"), sq("e5")).unwrap_err();
        assert_eq!(err, ChessError::NotYourTurn { expected: Color::White });
    }

    #[test]
    fn first_to_move_is_configurable() {
        let config = GameConfig {
            first_to_move: Color::Black,
            ..GameConfig::human_vs_human()
        };
        let mut game = Game::new(config);
        assert_eq!(game.current_turn(), Color::Black);
        game.make_move(sq("d7"), sq("d5")).unwrap();
        assert_eq!(game.current_turn(), Color::White);
    }

    #[test]
    fn selection_state_machine() {
        let mut game = Game::new(GameConfig::human_vs_human());

        assert_eq!(game.select_square(sq("e7")).unwrap(), Selection::Ignored);
        assert_eq!(game.select_square(sq("e2")).unwrap(), Selection::Selected(sq("e2")));
        assert_eq!(game.select_square(sq("e2")).unwrap(), Selection::Deselected);
        assert_eq!(game.selected(), None);

        game.select_square(sq("e2")).unwrap();
        assert_eq!(game.select_square(sq("g1")).unwrap(), Selection::Switched(sq("g1")));
        assert_eq!(game.select_square(sq("g4")).unwrap(), Selection::Ignored);
        assert_eq!(game.selected(), Some(sq("g1")));

        match game.select_square(sq("f3")).unwrap() {
            Selection::Moved(result) => assert_eq!(result.to, sq("f3")),
            other => panic!("expected a move, got {:?}", other),
        }
        assert_eq!(game.selected(), None);
        assert_eq!(game.current_turn(), Color::Black);
    }

    #[test]
    fn off_board_destination_is_rejected() {
        let mut game = Game::new(GameConfig::human_vs_human());
        let err = game.make_move(sq("e2"), Position { x: 200, y: 0 }).unwrap_err();
        assert_eq!(err, ChessError::InvalidSquare("(200,0)".to_string()));
        assert_eq!(err.to_string(), "invalid square '(200,0)'");
        assert!(game.history().is_empty());
        assert_eq!(game.current_turn(), Color::White);
    }

    #[test]
    fn from_board_requires_one_king_each() {
        let mut board = Board::empty();
        board.place(PieceType::Rook, Color::White, sq("a1"));
        let err = Game::from_board(board.clone(), Color::White, GameConfig::default()).unwrap_err();
        assert!(matches!(err, ChessError::InvalidPosition(_)));

        board.place(PieceType::King, Color::White, sq("e1"));
        board.place(PieceType::King, Color::Black, sq("e8"));
        board.place(PieceType::King, Color::White, sq("h1"));
        assert!(Game::from_board(board, Color::White, GameConfig::default()).is_err());
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let mut board = Board::empty();
        board.place(PieceType::King, Color::White, sq("e1"));
        board.place(PieceType::Bishop, Color::White, sq("e2"));
        board.place(PieceType::Rook, Color::Black, sq("e8"));
        board.place(PieceType::King, Color::Black, sq("a8"));
        let mut game = Game::from_board(board, Color::White, GameConfig::human_vs_human()).unwrap();

        assert!(game.legal_destinations(sq("e2")).is_empty());
        let err = game.make_move(sq("e2"), sq("d3")).unwrap_err();
        assert_eq!(err, ChessError::IllegalMove { from: sq("e2"), to: sq("d3") });
    }

    #[test]
    fn promotion_through_controller() {
        let mut board = Board::empty();
        board.place(PieceType::King, Color::White, sq("e1"));
        board.place(PieceType::King, Color::Black, sq("h7"));
        board.place(PieceType::Pawn, Color::White, sq("a7"));
        let mut game = Game::from_board(board, Color::White, GameConfig::human_vs_human()).unwrap();

        let result = game
            .make_move_with_promotion(sq("a7"), sq("a8"), Some(PieceType::Rook))
            .unwrap();
        assert!(result.is_promotion);
        assert_eq!(result.promoted_to, Some(PieceType::Rook));
        assert_eq!(game.board().piece_at(sq("a8")).unwrap().piece_type, PieceType::Rook);

        game.undo().unwrap();
        let pawn = game.board().piece_at(sq("a7")).unwrap();
        assert_eq!(pawn.piece_type, PieceType::Pawn);
        assert!(!pawn.has_moved);
        assert_eq!(game.current_turn(), Color::White);
    }

    #[test]
    fn undo_on_fresh_game_fails() {
        let mut game = Game::default();
        assert_eq!(game.undo().unwrap_err(), ChessError::EmptyHistory);
    }

    #[test]
    fn reset_restores_start() {
        let mut game = Game::new(GameConfig::human_vs_human());
        game.make_move(sq("e2"), sq("e4")).unwrap();
        game.reset();
        assert_eq!(game.board(), &Board::new());
        assert!(game.history().is_empty());
        assert_eq!(game.current_turn(), Color::White);
        assert_eq!(game.config().ai_side, None);
    }

    #[test]
    fn ai_turn_follows_config() {
        let mut game = Game::new(GameConfig::default());
        assert!(!game.is_ai_turn());
        game.make_move(sq("e2"), sq("e4")).unwrap();
        assert!(game.is_ai_turn());
    }
}
