use std::fmt;

use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: i8 = 8;

/// A square on the board. `x` is the file (0 = a), `y` is the row counted
/// from Black's back rank (0 = rank 8, 7 = rank 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub fn new(x: u8, y: u8) -> Option<Self> {
        if x < BOARD_SIZE as u8 && y < BOARD_SIZE as u8 {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// Signed-coordinate constructor used by the move generators, where
    /// walking a direction vector can step off the board.
    pub fn from_signed(x: i8, y: i8) -> Option<Self> {
        if (0..BOARD_SIZE).contains(&x) && (0..BOARD_SIZE).contains(&y) {
            Some(Self { x: x as u8, y: y as u8 })
        } else {
            None
        }
    }

    pub fn offset(self, dx: i8, dy: i8) -> Option<Self> {
        Self::from_signed(self.x as i8 + dx, self.y as i8 + dy)
    }

    pub fn is_valid(self) -> bool {
        self.x < BOARD_SIZE as u8 && self.y < BOARD_SIZE as u8
    }

    pub fn from_algebraic(notation: &str) -> Option<Self> {
        let mut chars = notation.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }

        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }

        Some(Self {
            x: (file as u8) - b'a',
            y: b'8' - (rank as u8),
        })
    }

    /// Algebraic name of the square, or raw `(x,y)` coordinates when it is
    /// off the board.
    pub fn to_algebraic(self) -> String {
        if !self.is_valid() {
            return format!("({},{})", self.x, self.y);
        }
        format!("{}{}", (b'a' + self.x) as char, (b'8' - self.y) as char)
    }

    /// All 64 squares, row by row from the top.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE as u8).flat_map(|y| (0..BOARD_SIZE as u8).map(move |x| Position { x, y }))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algebraic_maps_to_fixed_orientation() {
        assert_eq!(Position::from_algebraic("a8"), Some(Position { x: 0, y: 0 }));
        assert_eq!(Position::from_algebraic("e1"), Some(Position { x: 4, y: 7 }));
        assert_eq!(Position::from_algebraic("h1"), Some(Position { x: 7, y: 7 }));
        assert_eq!(Position { x: 4, y: 6 }.to_algebraic(), "e2");
    }

    #[test]
    fn rejects_malformed_notation() {
        assert_eq!(Position::from_algebraic("i1"), None);
        assert_eq!(Position::from_algebraic("a9"), None);
        assert_eq!(Position::from_algebraic("a"), None);
        assert_eq!(Position::from_algebraic("a1x"), None);
    }

    #[test]
    fn off_board_squares_print_as_coordinates() {
        assert_eq!(Position { x: 200, y: 0 }.to_algebraic(), "(200,0)");
        assert_eq!(Position { x: 3, y: 8 }.to_string(), "(3,8)");
    }

    #[test]
    fn offsets_stay_on_board() {
        let corner = Position::new(0, 0).unwrap();
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(1, 1), Position::new(1, 1));
        assert_eq!(Position::new(8, 0), None);
        assert_eq!(Position::all().count(), 64);
    }
}
