use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{piece::Color, ChessError};

/// Strength tier of the automated opponent. The numeric value is the divisor
/// the search uses when narrowing its candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
    Master = 4,
}

impl Difficulty {
    pub fn level(self) -> usize {
        self as usize
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Master => "master",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "easy" => Ok(Difficulty::Easy),
            "2" | "medium" => Ok(Difficulty::Medium),
            "3" | "hard" => Ok(Difficulty::Hard),
            "4" | "master" => Ok(Difficulty::Master),
            other => Err(ChessError::InvalidConfig(format!("unknown difficulty '{}'", other))),
        }
    }
}

impl FromStr for Color {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            other => Err(ChessError::InvalidConfig(format!("unknown side '{}'", other))),
        }
    }
}

/// Parses an optional side: `none` (or empty) means no side.
pub fn parse_optional_side(s: &str) -> Result<Option<Color>, ChessError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "none" | "off" => Ok(None),
        other => other.parse().map(Some),
    }
}

/// Settings a game is started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub first_to_move: Color,
    pub ai_difficulty: Difficulty,
    /// Side played by the search, if any.
    pub ai_side: Option<Color>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            first_to_move: Color::White,
            ai_difficulty: Difficulty::Medium,
            ai_side: Some(Color::Black),
        }
    }
}

impl GameConfig {
    /// Reads `CHESS_FIRST_TO_MOVE`, `CHESS_AI_DIFFICULTY` and `CHESS_AI_SIDE`,
    /// keeping the default for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            first_to_move: std::env::var("CHESS_FIRST_TO_MOVE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.first_to_move),
            ai_difficulty: std::env::var("CHESS_AI_DIFFICULTY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ai_difficulty),
            ai_side: std::env::var("CHESS_AI_SIDE")
                .ok()
                .and_then(|v| parse_optional_side(&v).ok())
                .unwrap_or(defaults.ai_side),
        }
    }

    /// Two humans, White first.
    pub fn human_vs_human() -> Self {
        Self {
            ai_side: None,
            ..Self::default()
        }
    }
}
