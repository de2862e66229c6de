//! Material counting for the score modifiers.

use crate::board::{occupied, BoardView};
use crate::types::Color;

/// Non-king material of each side, in centipawns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Material {
    pub white: i32,
    pub black: i32,
}

impl Material {
    #[must_use]
    pub fn of<B: BoardView + ?Sized>(pos: &B) -> Self {
        let mut material = Material::default();
        for ps in occupied(pos) {
            match ps.color {
                Color::White => material.white += ps.piece.value(),
                Color::Black => material.black += ps.piece.value(),
            }
        }
        material
    }

    /// Both sides' material together
    #[inline]
    #[must_use]
    pub const fn total(self) -> i32 {
        self.white + self.black
    }

    /// `side`'s material minus its opponent's
    #[inline]
    #[must_use]
    pub const fn advantage(self, side: Color) -> i32 {
        match side {
            Color::White => self.white - self.black,
            Color::Black => self.black - self.white,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn start_position_is_balanced() {
        let material = Material::of(&Board::new());
        assert_eq!(material.white, 8 * 100 + 2 * 320 + 2 * 330 + 2 * 500 + 900);
        assert_eq!(material.total(), 2 * 4000);
        assert_eq!(material.advantage(Color::White), 0);
    }

    #[test]
    fn advantage_is_relative_to_the_side() {
        let material = Material::of(&Board::from_fen("4k3/8/8/8/8/8/8/R3K2Q w - - 0 1"));
        assert_eq!(material.total(), 1400);
        assert_eq!(material.advantage(Color::White), 1400);
        assert_eq!(material.advantage(Color::Black), -1400);
    }
}
