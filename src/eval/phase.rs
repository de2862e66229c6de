//! Game phase detection.
//!
//! The phase decides which network evaluates a line. It is re-detected at
//! most once per depth level: the first evaluation at a newly reached depth
//! checks it, later evaluations at the same depth reuse the answer.

use crate::nnue::Phase;

use super::params::EvalParams;
use super::score::{Score, DRAW};

/// Phase implied by a preliminary score at `depth`.
#[must_use]
pub fn detect_phase(eval: Score, depth: i32, params: &EvalParams) -> Phase {
    if depth >= params.phase_check_depth {
        if eval < DRAW - params.endgame_margin {
            return Phase::Endgame;
        }
        if eval > DRAW + params.sacrifice_margin {
            return Phase::Sacrifice;
        }
    }
    Phase::Middlegame
}

/// Remembers the last depth at which the phase was checked.
#[derive(Clone, Debug, Default)]
pub struct PhaseDetector {
    last_checked_depth: Option<i32>,
}

impl PhaseDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.last_checked_depth = None;
    }

    #[must_use]
    pub fn last_checked_depth(&self) -> Option<i32> {
        self.last_checked_depth
    }

    /// Whether an evaluation at `depth` should re-detect the phase
    #[inline]
    #[must_use]
    pub fn should_check(&self, depth: i32, params: &EvalParams) -> bool {
        depth >= params.phase_check_depth && self.last_checked_depth != Some(depth)
    }

    /// Re-detect the phase if `depth` calls for it.
    ///
    /// `prelim` is only evaluated when a check happens. Returns the detected
    /// phase, or `None` when no check was due.
    pub fn detect<F>(&mut self, depth: i32, params: &EvalParams, prelim: F) -> Option<Phase>
    where
        F: FnOnce() -> Score,
    {
        if !self.should_check(depth, params) {
            return None;
        }
        self.last_checked_depth = Some(depth);
        Some(detect_phase(prelim(), depth, params))
    }
}
