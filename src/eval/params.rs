//! Evaluation tuning parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunable constants of phase detection and the score modifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EvalParams {
    /// Phase detection runs only at or beyond this depth
    pub phase_check_depth: i32,
    /// Below `DRAW - endgame_margin` the endgame network takes over
    pub endgame_margin: i32,
    /// Above `DRAW + sacrifice_margin` the sacrifice network takes over
    pub sacrifice_margin: i32,
    pub better_than_material_threshold: i32,
    pub better_than_material_base: i32,
    /// Excess over the threshold is divided by this before it is added
    pub better_than_material_divisor: i32,
    /// Sacrifice bonuses need more total material than this
    pub sacrifice_material_floor: i32,
    /// Material drop against the root that counts as a sacrifice
    pub sacrifice_trigger: i32,
    pub sacrifice_bonus_winning: i32,
    pub sacrifice_bonus_ahead: i32,
    /// Above this score the larger sacrifice bonus applies
    pub sacrifice_winning_margin: i32,
    /// Scaling multiplier is `(scaling_base + total / scaling_material_divisor) / scaling_denominator`
    pub scaling_base: i32,
    pub scaling_material_divisor: i32,
    pub scaling_denominator: i32,
    /// Half-moves without progress at which the score has decayed to zero
    pub fifty_move_horizon: u32,
    pub contempt: i32,
}

impl Default for EvalParams {
    fn default() -> Self {
        EvalParams {
            phase_check_depth: 6,
            endgame_margin: 100,
            sacrifice_margin: 300,
            better_than_material_threshold: 50,
            better_than_material_base: 25,
            better_than_material_divisor: 10,
            sacrifice_material_floor: 3500,
            sacrifice_trigger: 100,
            sacrifice_bonus_winning: 80,
            sacrifice_bonus_ahead: 40,
            sacrifice_winning_margin: 300,
            scaling_base: 750,
            scaling_material_divisor: 25,
            scaling_denominator: 1024,
            fifty_move_horizon: 200,
            contempt: 50,
        }
    }
}
