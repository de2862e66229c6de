//! Core chess types shared by the evaluator and the reference board.
//!
//! - `Piece` and `Color` - piece kinds and sides
//! - `Square` - compact 0..64 square index (a1 = 0, h8 = 63)
//! - packed piece codes used by host engines that store pieces as a single byte

mod piece;
mod square;

pub use piece::{decode_piece, encode_piece, Color, Piece};
pub use square::Square;

/// Maximum search depth in plies supported by the accumulator stack.
pub const MAX_PLY: usize = 256;
