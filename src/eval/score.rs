//! Score type and sentinel values.

use crate::types::MAX_PLY;

/// Evaluation in centipawns from the side to move's point of view.
pub type Score = i32;

pub const DRAW: Score = 0;

pub const MATE: Score = 32000;

/// Smallest score that still denotes a forced mate
pub const MATE_IN_MAX_PLY: Score = MATE - MAX_PLY as Score;

/// Score of a tablebase win at the root
pub const TB_WIN: Score = MATE_IN_MAX_PLY - 1;

/// Smallest score that still denotes a tablebase-proven result
pub const TB_WIN_IN_MAX_PLY: Score = TB_WIN - MAX_PLY as Score;

/// True for forced wins and losses, mate or tablebase.
///
/// Such scores are exact and must not be reshaped by heuristics.
#[inline]
#[must_use]
pub const fn is_decisive(score: Score) -> bool {
    score >= TB_WIN_IN_MAX_PLY || score <= -TB_WIN_IN_MAX_PLY
}
