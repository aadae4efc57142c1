use chess_core::{piece::Color, Board, Difficulty, Game, Move, MoveResult, Result};
use log::{debug, info};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{
    evaluation::MAX_JITTER,
    search::{candidate_pool, score_candidates},
};

/// The automated opponent. Holds its own RNG so a seeded instance plays
/// reproducibly.
#[derive(Clone, Debug)]
pub struct ChessAI {
    difficulty: Difficulty,
    rng: StdRng,
}

impl ChessAI {
    pub fn new(difficulty: Difficulty) -> Self {
        ChessAI {
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        ChessAI {
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Picks a move for `side`. The board is taken by value: the search only
    /// ever works on its own copy of the position.
    pub fn choose_move(&mut self, board: Board, side: Color) -> Option<Move> {
        let moves = board.legal_moves_for(side);
        if moves.is_empty() {
            debug!("{} has no legal moves", side);
            return None;
        }

        if self.difficulty == Difficulty::Easy {
            return moves.choose(&mut self.rng).copied();
        }

        let jitter: Vec<f64> = (0..moves.len())
            .map(|_| self.rng.gen_range(0.0..MAX_JITTER))
            .collect();
        let scored = score_candidates(&board, side, &moves, &jitter);
        let pool = candidate_pool(scored, self.difficulty);

        pool.choose(&mut self.rng).map(|s| s.mv)
    }

    /// Plays the automated side's move if it is that side's turn and the game
    /// is still running. Returns `None` when there is nothing to do.
    ///
    /// The tier follows the game's configuration, so changing
    /// `ai_difficulty` mid-game takes effect on the next turn.
    pub fn play_turn(&mut self, game: &mut Game) -> Result<Option<MoveResult>> {
        if !game.is_ai_turn() {
            return Ok(None);
        }

        let configured = game.config().ai_difficulty;
        if configured != self.difficulty {
            debug!("difficulty {} -> {}", self.difficulty, configured);
            self.difficulty = configured;
        }
        self.play_move(game)
    }

    /// Plays a move for whichever side is on turn, unless the game is over.
    pub fn play_move(&mut self, game: &mut Game) -> Result<Option<MoveResult>> {
        if game.status().is_terminal() {
            return Ok(None);
        }

        let side = game.current_turn();
        let Some(mv) = self.choose_move(game.board().clone(), side) else {
            return Ok(None);
        };

        let result = game.make_move(mv.from, mv.to)?;
        info!("{} ({}) plays {} -> {}", side, self.difficulty, mv.from, mv.to);
        Ok(Some(result))
    }
}

impl Default for ChessAI {
    fn default() -> Self {
        ChessAI::new(Difficulty::default())
    }
}
