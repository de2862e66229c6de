//! Input feature indexing and per-move feature deltas.
//!
//! Each (color, piece, square) triple maps to one input of the white
//! perspective and one input of the black perspective. The black view sees
//! the board mirrored vertically with the colors swapped, so both
//! perspectives read "my pieces" from the first 384 inputs.

use crate::types::{decode_piece, Color, Piece, Square};

/// Inputs per color: 6 piece types x 64 squares
pub const COLOR_STRIDE: usize = 64 * 6;

/// Inputs per piece type
pub const PIECE_STRIDE: usize = 64;

/// Feature indices of a piece on a square, as `(white_index, black_index)`.
#[inline]
#[must_use]
pub const fn feature_indices(color: Color, piece: Piece, square: Square) -> (usize, usize) {
    let c = color.index();
    let p = piece.index() * PIECE_STRIDE;
    let white = c * COLOR_STRIDE + p + square.index();
    let black = (c ^ 1) * COLOR_STRIDE + p + (square.index() ^ 56);
    (white, black)
}

/// Feature indices for a packed piece code (see [`decode_piece`]).
///
/// Returns `None` for codes that do not name a piece.
#[inline]
#[must_use]
pub fn feature_indices_packed(code: u8, square: Square) -> Option<(usize, usize)> {
    decode_piece(code).map(|(color, piece)| feature_indices(color, piece, square))
}

/// A piece standing on (or leaving) a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceSquare {
    pub color: Color,
    pub piece: Piece,
    pub square: Square,
}

impl PieceSquare {
    #[inline]
    #[must_use]
    pub const fn new(color: Color, piece: Piece, square: Square) -> Self {
        PieceSquare {
            color,
            piece,
            square,
        }
    }

    /// `(white_index, black_index)` of this piece-square
    #[inline]
    #[must_use]
    pub const fn indices(self) -> (usize, usize) {
        feature_indices(self.color, self.piece, self.square)
    }
}

/// Feature changes caused by one move.
///
/// At most two pieces leave squares (the mover, plus a captured piece or the
/// castling rook) and at most two arrive (the mover or its promotion, plus
/// the castling rook).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureDelta {
    removed: [Option<PieceSquare>; 2],
    added: [Option<PieceSquare>; 2],
}

impl FeatureDelta {
    #[must_use]
    pub const fn new() -> Self {
        FeatureDelta {
            removed: [None, None],
            added: [None, None],
        }
    }

    /// Record a piece leaving a square.
    ///
    /// # Panics
    /// Panics if two removals were already recorded.
    pub fn remove(&mut self, color: Color, piece: Piece, square: Square) -> &mut Self {
        let slot = self
            .removed
            .iter_mut()
            .find(|slot| slot.is_none())
            .expect("a move removes at most two pieces");
        *slot = Some(PieceSquare::new(color, piece, square));
        self
    }

    /// Record a piece arriving on a square.
    ///
    /// # Panics
    /// Panics if two additions were already recorded.
    pub fn add(&mut self, color: Color, piece: Piece, square: Square) -> &mut Self {
        let slot = self
            .added
            .iter_mut()
            .find(|slot| slot.is_none())
            .expect("a move adds at most two pieces");
        *slot = Some(PieceSquare::new(color, piece, square));
        self
    }

    pub fn removed(&self) -> impl Iterator<Item = PieceSquare> + '_ {
        self.removed.iter().flatten().copied()
    }

    pub fn added(&self) -> impl Iterator<Item = PieceSquare> + '_ {
        self.added.iter().flatten().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.iter().chain(&self.added).all(Option::is_none)
    }
}
