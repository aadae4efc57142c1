use chess_core::{piece::Color, Board, Difficulty, Move};
use log::debug;
use rayon::prelude::*;

use crate::evaluation::score_move;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: f64,
}

/// Scores each candidate on its own copy of `board`, adding the matching
/// entry of `jitter`. Candidates are independent, so they are scored in
/// parallel.
pub fn score_candidates(board: &Board, side: Color, moves: &[Move], jitter: &[f64]) -> Vec<ScoredMove> {
    moves
        .par_iter()
        .zip(jitter.par_iter())
        .map(|(mv, noise)| {
            let mut scratch = board.clone();
            ScoredMove {
                mv: *mv,
                score: score_move(&mut scratch, mv, side) + noise,
            }
        })
        .collect()
}

/// Sorts best-first and narrows to the pool the final pick is drawn from.
///
/// Hard and Master first keep the better half; every tier then keeps the top
/// `ceil(count / level)`.
pub fn candidate_pool(mut scored: Vec<ScoredMove>, difficulty: Difficulty) -> Vec<ScoredMove> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    if difficulty >= Difficulty::Hard {
        let half = scored.len().div_ceil(2);
        scored.truncate(half);
    }

    let keep = scored.len().div_ceil(difficulty.level()).max(1);
    scored.truncate(keep);

    debug!(
        "candidate pool of {} at {} (best {:.2})",
        scored.len(),
        difficulty,
        scored.first().map_or(0.0, |s| s.score)
    );
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Position;

    fn fake(count: usize) -> Vec<ScoredMove> {
        (0..count)
            .map(|i| ScoredMove {
                mv: Move::new(
                    Position::new((i % 8) as u8, 0).unwrap(),
                    Position::new((i % 8) as u8, (i / 8 % 8) as u8).unwrap(),
                ),
                score: i as f64,
            })
            .collect()
    }

    #[test]
    fn pool_sizes_per_tier() {
        assert_eq!(candidate_pool(fake(20), Difficulty::Easy).len(), 20);
        assert_eq!(candidate_pool(fake(20), Difficulty::Medium).len(), 10);
        assert_eq!(candidate_pool(fake(20), Difficulty::Hard).len(), 4);
        assert_eq!(candidate_pool(fake(20), Difficulty::Master).len(), 3);
        assert_eq!(candidate_pool(fake(3), Difficulty::Master).len(), 1);
        assert_eq!(candidate_pool(fake(1), Difficulty::Hard).len(), 1);
    }

    #[test]
    fn pool_keeps_the_best_scores() {
        let pool = candidate_pool(fake(20), Difficulty::Master);
        let scores: Vec<f64> = pool.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![19.0, 18.0, 17.0]);
    }

    #[test]
    fn parallel_scoring_matches_sequential() {
        let board = Board::new();
        let moves = board.legal_moves_for(Color::White);
        let jitter = vec![0.0; moves.len()];

        let scored = score_candidates(&board, Color::White, &moves, &jitter);
        assert_eq!(scored.len(), moves.len());
        for (s, mv) in scored.iter().zip(moves.iter()) {
            let mut scratch = board.clone();
            assert_eq!(s.mv, *mv);
            assert_eq!(s.score, score_move(&mut scratch, mv, Color::White));
        }
    }
}
