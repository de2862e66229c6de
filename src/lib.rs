//! Phased NNUE evaluation for chess engines.
//!
//! Three quantized networks share one architecture; a search line switches
//! between them as its preliminary score suggests a quiet middlegame, a
//! worse endgame, or a winning sacrifice. Hidden-layer accumulators are kept
//! incrementally on a per-line stack and the network output is reshaped by a
//! fixed pipeline of material heuristics.
//!
//! # Example
//! ```
//! use phased_nnue::board::Board;
//! use phased_nnue::eval::{self, EvaluationState};
//! use phased_nnue::nnue::NetworkSet;
//!
//! let networks = NetworkSet::zeroed();
//! let mut board = Board::new();
//! let mut state = EvaluationState::new(&networks, &board);
//!
//! let (delta, undo) = board.make_move("e2e4".parse().unwrap()).unwrap();
//! eval::push(&mut state, &board, &delta);
//! let score = eval::evaluate(&board, &mut state, 1, 1);
//! assert_eq!(score, 0);
//!
//! board.unmake_move(undo);
//! eval::pop(&mut state);
//! ```

pub mod board;
pub mod error;
pub mod eval;
pub mod nnue;
pub mod types;

#[cfg(test)]
mod test_support;

pub use board::{Board, BoardView, Move};
pub use error::{FenError, LoadError};
pub use eval::{EvalParams, EvaluationState, Score};
pub use nnue::{FeatureDelta, Network, NetworkSet, Phase};
pub use types::{Color, Piece, Square};
