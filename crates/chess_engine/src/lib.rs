pub mod ai;
pub mod evaluation;
pub mod search;

pub use ai::ChessAI;
pub use evaluation::{piece_value, score_move};
pub use search::{candidate_pool, score_candidates, ScoredMove};
