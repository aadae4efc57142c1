use chess_core::{
    config::parse_optional_side, ChessError, Color, Difficulty, Game, GameConfig, PieceType,
    Position, Result,
};
use chess_engine::ChessAI;
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "neon-chess", about = "Headless chess match against the built-in opponent")]
struct Args {
    /// Side played by the search: white, black or none (overrides CHESS_AI_SIDE)
    #[arg(long)]
    ai_side: Option<String>,

    /// Search strength: easy, medium, hard, master (overrides CHESS_AI_DIFFICULTY)
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Side to move first (overrides CHESS_FIRST_TO_MOVE)
    #[arg(long)]
    first: Option<Color>,

    /// Let a second search play the other side at this strength
    #[arg(long)]
    opponent: Option<Difficulty>,

    /// Moves for the side without a search, e.g. "e2e4 g1f3 e7e8q"
    #[arg(long, default_value = "")]
    moves: String,

    /// Stop after this many plies
    #[arg(long, default_value_t = 200)]
    max_plies: usize,

    /// Random seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,
}

fn build_config(args: &Args) -> Result<GameConfig> {
    let mut config = GameConfig::from_env();
    if let Some(side) = &args.ai_side {
        config.ai_side = parse_optional_side(side)?;
    }
    if let Some(difficulty) = args.difficulty {
        config.ai_difficulty = difficulty;
    }
    if let Some(first) = args.first {
        config.first_to_move = first;
    }
    Ok(config)
}

fn make_ai(difficulty: Difficulty, seed: Option<u64>) -> ChessAI {
    match seed {
        Some(seed) => ChessAI::with_seed(difficulty, seed),
        None => ChessAI::new(difficulty),
    }
}

/// Parses coordinate notation like `e2e4` with an optional promotion letter.
fn parse_move(text: &str) -> Result<(Position, Position, Option<PieceType>)> {
    let invalid = || ChessError::InvalidSquare(text.to_string());
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(invalid());
    }

    let from = Position::from_algebraic(&text[0..2]).ok_or_else(invalid)?;
    let to = Position::from_algebraic(&text[2..4]).ok_or_else(invalid)?;
    let promotion = match text[4..].chars().next() {
        None => None,
        Some('q') => Some(PieceType::Queen),
        Some('r') => Some(PieceType::Rook),
        Some('b') => Some(PieceType::Bishop),
        Some('n') => Some(PieceType::Knight),
        Some(_) => return Err(invalid()),
    };
    Ok((from, to, promotion))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let mut game = Game::new(config);
    let mut ai = make_ai(config.ai_difficulty, args.seed);
    let mut opponent = args
        .opponent
        .map(|d| make_ai(d, args.seed.map(|s| s.wrapping_add(1))));
    let mut scripted = args.moves.split_whitespace();

    info!(
        "new game: {} moves first, search plays {:?} at {}",
        config.first_to_move, config.ai_side, config.ai_difficulty
    );

    for _ in 0..args.max_plies {
        if game.status().is_terminal() {
            break;
        }

        let played = if game.is_ai_turn() {
            ai.play_turn(&mut game)?
        } else if let Some(opponent) = opponent.as_mut() {
            opponent.play_move(&mut game)?
        } else if let Some(text) = scripted.next() {
            let (from, to, promotion) = parse_move(text)?;
            Some(game.make_move_with_promotion(from, to, promotion)?)
        } else {
            None
        };

        if played.is_none() {
            break;
        }
    }

    println!("{}", game.board());
    println!(
        "status: {:?}, {} to move, {} plies played",
        game.status(),
        game.current_turn(),
        game.history().len()
    );
    Ok(())
}
