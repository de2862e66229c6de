//! Phased evaluation: network selection, score modifiers and per-line state.
//!
//! A search driver owns one [`EvaluationState`] per line and calls, in
//! order, [`init_state`] at the root, [`push`] after every move, [`pop`]
//! after every take-back, and [`evaluate`] at leaves.

pub mod material;
pub mod modifiers;
pub mod params;
pub mod phase;
pub mod score;
mod state;

#[cfg(test)]
mod tests;

pub use material::Material;
pub use modifiers::{ModifierContext, ModifierTrace};
pub use params::EvalParams;
pub use phase::{detect_phase, PhaseDetector};
pub use score::{is_decisive, Score, DRAW, MATE, MATE_IN_MAX_PLY, TB_WIN, TB_WIN_IN_MAX_PLY};
pub use state::EvaluationState;

use crate::board::BoardView;
use crate::nnue::FeatureDelta;

/// Reset `state` for a new search rooted at `pos`.
pub fn init_state<B: BoardView + ?Sized>(state: &mut EvaluationState<'_>, pos: &B) {
    state.init(pos);
}

/// Record a move made on the board; `pos` is the position after it.
pub fn push<B: BoardView + ?Sized>(state: &mut EvaluationState<'_>, pos: &B, delta: &FeatureDelta) {
    state.push(pos, delta);
}

/// Record a move taken back on the board.
pub fn pop(state: &mut EvaluationState<'_>) {
    state.pop();
}

/// Score `pos` for the side to move at `depth`, `ply` plies from the root.
pub fn evaluate<B: BoardView + ?Sized>(pos: &B, state: &mut EvaluationState<'_>, depth: i32, ply: usize) -> Score {
    state.evaluate(pos, depth, ply)
}
