//! Heuristic score modifiers applied after the network.
//!
//! The pipeline runs in a fixed order on the raw network score:
//! 1. better-than-material bonus
//! 2. sacrifice bonus (root side only)
//! 3. both bonuses are added to the score
//! 4. material scaling
//! 5. draw contempt, added as the final baseline
//! 6. fifty-move decay of the result
//!
//! All arithmetic is integer with truncating division. Decisive scores skip
//! the pipeline entirely.

use crate::board::BoardView;

use super::material::Material;
use super::params::EvalParams;
use super::score::{is_decisive, Score, DRAW};

/// Position facts the modifiers depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifierContext {
    /// Distance from the root of the search line
    pub ply: usize,
    pub halfmove_clock: u32,
    /// Non-king material of both sides
    pub total_material: i32,
    /// Side to move's material minus the opponent's
    pub material_advantage: i32,
    /// Material advantage recorded at the root of the line
    pub root_advantage: i32,
}

impl ModifierContext {
    #[must_use]
    pub fn new<B: BoardView + ?Sized>(pos: &B, ply: usize, root_advantage: i32) -> Self {
        let material = Material::of(pos);
        ModifierContext {
            ply,
            halfmove_clock: pos.halfmove_clock(),
            total_material: material.total(),
            material_advantage: material.advantage(pos.side_to_move()),
            root_advantage,
        }
    }
}

/// Bonus for a score that outruns the material balance.
#[must_use]
pub fn better_than_material(score: Score, advantage: i32, params: &EvalParams) -> Score {
    let threshold = params.better_than_material_threshold;
    if score > 0 && score > advantage + threshold {
        params.better_than_material_base + (score - advantage - threshold) / params.better_than_material_divisor
    } else if score < 0 && score < advantage - threshold {
        -(params.better_than_material_base + (advantage - score - threshold) / params.better_than_material_divisor)
    } else {
        0
    }
}

/// Bonus for the root side when it is doing well after giving up material.
///
/// Only the root snapshot is compared against. Detecting sacrifices made and
/// recovered within the line would need the advantage at every ply; that
/// history would be passed in here in place of `root_advantage`.
#[must_use]
pub fn sacrifice_bonus(score: Score, ctx: &ModifierContext, params: &EvalParams) -> Score {
    if ctx.ply % 2 != 0 || ctx.total_material <= params.sacrifice_material_floor {
        return 0;
    }
    if ctx.material_advantage >= ctx.root_advantage - params.sacrifice_trigger {
        return 0;
    }

    if score > DRAW + params.sacrifice_winning_margin {
        params.sacrifice_bonus_winning
    } else if score > DRAW {
        params.sacrifice_bonus_ahead
    } else {
        0
    }
}

/// Scale by `(base + total / divisor) / denominator`, exactly.
///
/// The multiplier is evaluated as one rational so no precision is lost
/// before the final truncation.
#[must_use]
pub fn material_scaling(score: Score, total_material: i32, params: &EvalParams) -> Score {
    let numerator = i64::from(params.scaling_base) * i64::from(params.scaling_material_divisor)
        + i64::from(total_material);
    let denominator = i64::from(params.scaling_material_divisor) * i64::from(params.scaling_denominator);
    (i64::from(score) * numerator / denominator) as Score
}

/// Shrink the score linearly toward zero as the no-progress clock runs.
#[must_use]
pub fn fifty_move_decay(score: Score, halfmove_clock: u32, params: &EvalParams) -> Score {
    let horizon = params.fifty_move_horizon;
    if halfmove_clock == 0 || horizon == 0 {
        return score;
    }
    let remaining = horizon.saturating_sub(halfmove_clock);
    (i64::from(score) * i64::from(remaining) / i64::from(horizon)) as Score
}

/// Baseline offset: behind on material welcomes a draw, ahead avoids one.
#[must_use]
pub fn draw_contempt(advantage: i32, params: &EvalParams) -> Score {
    match advantage.signum() {
        -1 => DRAW + params.contempt,
        1 => DRAW - params.contempt,
        _ => DRAW,
    }
}

/// Every intermediate value of one pass through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifierTrace {
    pub raw: Score,
    /// The raw score was decisive and passed through untouched
    pub bypassed: bool,
    pub better_than_material: Score,
    pub sacrifice_bonus: Score,
    pub scaled: Score,
    pub contempt: Score,
    pub final_score: Score,
}

/// Run the pipeline, keeping each stage.
#[must_use]
pub fn trace(raw: Score, ctx: &ModifierContext, params: &EvalParams) -> ModifierTrace {
    if is_decisive(raw) {
        return ModifierTrace {
            raw,
            bypassed: true,
            better_than_material: 0,
            sacrifice_bonus: 0,
            scaled: raw,
            contempt: 0,
            final_score: raw,
        };
    }

    let btm = better_than_material(raw, ctx.material_advantage, params);
    let sacrifice = sacrifice_bonus(raw, ctx, params);
    let scaled = material_scaling(raw + btm + sacrifice, ctx.total_material, params);
    let contempt = draw_contempt(ctx.material_advantage, params);
    let final_score = fifty_move_decay(scaled + contempt, ctx.halfmove_clock, params);

    ModifierTrace {
        raw,
        bypassed: false,
        better_than_material: btm,
        sacrifice_bonus: sacrifice,
        scaled,
        contempt,
        final_score,
    }
}

/// Run the pipeline.
#[inline]
#[must_use]
pub fn apply(raw: Score, ctx: &ModifierContext, params: &EvalParams) -> Score {
    trace(raw, ctx, params).final_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::score::{MATE, TB_WIN};

    fn ctx(ply: usize, total: i32, advantage: i32, root: i32, clock: u32) -> ModifierContext {
        ModifierContext {
            ply,
            halfmove_clock: clock,
            total_material: total,
            material_advantage: advantage,
            root_advantage: root,
        }
    }

    #[test]
    fn better_than_material_rewards_the_excess() {
        let p = EvalParams::default();
        assert_eq!(better_than_material(200, 0, &p), 25 + 15);
        assert_eq!(better_than_material(-200, 0, &p), -(25 + 15));
        assert_eq!(better_than_material(59, 0, &p), 25);
        assert_eq!(better_than_material(50, 0, &p), 0);
        assert_eq!(better_than_material(200, 300, &p), 0);
        assert_eq!(better_than_material(-200, -300, &p), 0);
        // The excess divides with truncation
        assert_eq!(better_than_material(169, 100, &p), 25 + 1);
    }

    #[test]
    fn sacrifice_bonus_requires_even_ply() {
        let p = EvalParams::default();
        for ply in [1, 3, 5, 17, 255] {
            for score in [-500, 0, 100, 1000] {
                assert_eq!(sacrifice_bonus(score, &ctx(ply, 7000, -600, 0, 0), &p), 0);
            }
        }
    }

    #[test]
    fn sacrifice_bonus_tiers() {
        let p = EvalParams::default();
        let sacrificed = ctx(2, 7000, -300, 0, 0);
        assert_eq!(sacrifice_bonus(301, &sacrificed, &p), 80);
        assert_eq!(sacrifice_bonus(300, &sacrificed, &p), 40);
        assert_eq!(sacrifice_bonus(1, &sacrificed, &p), 40);
        assert_eq!(sacrifice_bonus(0, &sacrificed, &p), 0);
    }

    #[test]
    fn sacrifice_bonus_needs_material_and_a_real_sacrifice() {
        let p = EvalParams::default();
        // Total material at the floor
        assert_eq!(sacrifice_bonus(500, &ctx(0, 3500, -300, 0, 0), &p), 0);
        // Exactly the trigger is not enough
        assert_eq!(sacrifice_bonus(500, &ctx(0, 7000, -100, 0, 0), &p), 0);
        assert_eq!(sacrifice_bonus(500, &ctx(0, 7000, -101, 0, 0), &p), 80);
        // Measured against the root, not against zero
        assert_eq!(sacrifice_bonus(500, &ctx(0, 7000, 250, 400, 0), &p), 80);
    }

    #[test]
    fn material_scaling_is_exact_rational() {
        let p = EvalParams::default();
        // (750 + 8000/25) / 1024 = 26750 / 25600
        assert_eq!(material_scaling(100, 8000, &p), 104);
        assert_eq!(material_scaling(-100, 8000, &p), -104);
        assert_eq!(material_scaling(100, 0, &p), 73);
        // total / 25 keeps its fraction: 12 / 25 would vanish in integer math
        assert_eq!(material_scaling(25600, 12, &p), 18762);
    }

    #[test]
    fn fifty_move_decay_is_linear() {
        let p = EvalParams::default();
        assert_eq!(fifty_move_decay(300, 0, &p), 300);
        assert_eq!(fifty_move_decay(300, 100, &p), 150);
        assert_eq!(fifty_move_decay(-301, 1, &p), -299);
        assert_eq!(fifty_move_decay(300, 200, &p), 0);
        assert_eq!(fifty_move_decay(-300, 250, &p), 0);
    }

    #[test]
    fn contempt_follows_material() {
        let p = EvalParams::default();
        assert_eq!(draw_contempt(-1, &p), 50);
        assert_eq!(draw_contempt(900, &p), -50);
        assert_eq!(draw_contempt(0, &p), 0);
    }

    #[test]
    fn pipeline_combines_stages_in_order() {
        let p = EvalParams::default();
        let c = ctx(0, 7000, -300, 0, 20);
        let t = trace(200, &c, &p);

        assert!(!t.bypassed);
        assert_eq!(t.better_than_material, 25 + (200 + 300 - 50) / 10);
        assert_eq!(t.sacrifice_bonus, 40);
        let adjusted = 200 + t.better_than_material + t.sacrifice_bonus;
        assert_eq!(t.scaled, (i64::from(adjusted) * 25750 / 25600) as i32);
        assert_eq!(t.contempt, 50);
        assert_eq!(t.final_score, (t.scaled + 50) * 180 / 200);
        assert_eq!(apply(200, &c, &p), t.final_score);
    }

    #[test]
    fn clock_at_horizon_forces_zero() {
        let p = EvalParams::default();
        for raw in [-3000, -150, 0, 1, 250, 4000] {
            for advantage in [-900, 0, 500] {
                for ply in [0, 1, 2] {
                    let c = ctx(ply, 7800, advantage, 900, 200);
                    assert_eq!(apply(raw, &c, &p), 0, "raw {raw} advantage {advantage}");
                }
            }
        }
    }

    #[test]
    fn decisive_scores_pass_through() {
        let p = EvalParams::default();
        let c = ctx(0, 7000, -300, 0, 150);
        for raw in [MATE - 4, -MATE + 7, TB_WIN, -TB_WIN] {
            let t = trace(raw, &c, &p);
            assert!(t.bypassed);
            assert_eq!(t.final_score, raw);
        }
    }
}
