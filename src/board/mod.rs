//! Board-state interface consumed by the evaluator, plus a reference board.
//!
//! The evaluator only needs to know which piece stands on each square, who
//! is to move, and the no-progress clock. Any engine's position type can
//! provide that by implementing [`BoardView`].
//!
//! [`Board`] is a small mailbox implementation with FEN support and a
//! move-maker that reports the [`FeatureDelta`] of every move. It does not
//! generate or validate moves.
//!
//! # Example
//! ```
//! use phased_nnue::board::{Board, BoardView, Move};
//!
//! let mut board = Board::new();
//! let (delta, _undo) = board.make_move("e2e4".parse::<Move>().unwrap()).unwrap();
//! assert_eq!(delta.removed().count(), 1);
//! assert!(!board.white_to_move());
//! ```

mod fen;
mod make_unmake;
mod moves;
mod state;

pub use make_unmake::UnmakeInfo;
pub use moves::Move;
pub use state::Board;

pub(crate) use state::{CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q};

use crate::nnue::PieceSquare;
use crate::types::{Color, Piece, Square};

/// Read-only view of a position.
pub trait BoardView {
    /// The piece on `sq`, if any
    fn piece_on(&self, sq: Square) -> Option<(Color, Piece)>;

    fn white_to_move(&self) -> bool;

    /// Half-moves since the last capture or pawn move
    fn halfmove_clock(&self) -> u32;

    fn side_to_move(&self) -> Color {
        if self.white_to_move() {
            Color::White
        } else {
            Color::Black
        }
    }
}

/// Every piece on the board, in square order.
pub fn occupied<B: BoardView + ?Sized>(pos: &B) -> impl Iterator<Item = PieceSquare> + '_ {
    Square::all().filter_map(move |sq| {
        pos.piece_on(sq)
            .map(|(color, piece)| PieceSquare::new(color, piece, sq))
    })
}
