//! Per-line evaluation state.

use log::{debug, trace};

use crate::board::BoardView;
use crate::nnue::{Accumulator, AccumulatorStack, FeatureDelta, NetworkSet, Phase};

use super::material::Material;
use super::modifiers::{self, ModifierContext, ModifierTrace};
use super::params::EvalParams;
use super::phase::PhaseDetector;
use super::score::Score;

/// Everything one search line needs to evaluate its positions.
///
/// Each concurrently searched line owns its own state. The networks are
/// shared read-only.
pub struct EvaluationState<'a> {
    networks: &'a NetworkSet,
    params: EvalParams,
    phase: Phase,
    detector: PhaseDetector,
    stack: AccumulatorStack,
    root_advantage: i32,
}

impl<'a> EvaluationState<'a> {
    /// Create a state rooted at `pos` with default parameters
    #[must_use]
    pub fn new<B: BoardView + ?Sized>(networks: &'a NetworkSet, pos: &B) -> Self {
        Self::with_params(networks, pos, EvalParams::default())
    }

    #[must_use]
    pub fn with_params<B: BoardView + ?Sized>(networks: &'a NetworkSet, pos: &B, params: EvalParams) -> Self {
        EvaluationState {
            networks,
            params,
            phase: Phase::Middlegame,
            detector: PhaseDetector::new(),
            stack: AccumulatorStack::from_position(pos, networks, Phase::Middlegame),
            root_advantage: Material::of(pos).advantage(pos.side_to_move()),
        }
    }

    /// Start a new search from `pos`.
    ///
    /// Resets the phase to middlegame, forgets the last checked depth,
    /// snapshots the root material balance, and rebuilds the root accumulator.
    pub fn init<B: BoardView + ?Sized>(&mut self, pos: &B) {
        self.phase = Phase::Middlegame;
        self.detector.reset();
        self.root_advantage = Material::of(pos).advantage(pos.side_to_move());
        self.stack.reset(
            Accumulator::from_position(pos, self.networks.get(Phase::Middlegame)),
            Phase::Middlegame,
        );
    }

    /// Advance one ply after a move has been made on `pos`.
    ///
    /// # Panics
    /// Panics if the line is already `MAX_PLY` plies deep.
    pub fn push<B: BoardView + ?Sized>(&mut self, pos: &B, delta: &FeatureDelta) {
        if self.stack.current_phase() == self.phase {
            self.stack.push(delta, self.networks);
        } else {
            // The parent was built by an earlier network
            self.stack.push_refreshed(pos, self.networks, self.phase);
        }
    }

    /// Retreat one ply after a move has been taken back.
    ///
    /// # Panics
    /// Panics at the root.
    #[inline]
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// Score `pos` for the side to move.
    ///
    /// `pos` must be the position the accumulator stack currently tracks.
    pub fn evaluate<B: BoardView + ?Sized>(&mut self, pos: &B, depth: i32, ply: usize) -> Score {
        self.evaluate_traced(pos, depth, ply).final_score
    }

    /// Like [`evaluate`](Self::evaluate), keeping every modifier stage.
    pub fn evaluate_traced<B: BoardView + ?Sized>(&mut self, pos: &B, depth: i32, ply: usize) -> ModifierTrace {
        self.sync_network(pos);

        let networks = self.networks;
        let white_to_move = pos.white_to_move();
        let (phase, stack) = (self.phase, &self.stack);
        let detected = self
            .detector
            .detect(depth, &self.params, || networks.evaluate(stack.current(), phase, white_to_move));

        if let Some(next) = detected.filter(|&p| p != self.phase) {
            debug!("phase switch at depth {depth}: {} -> {next}", self.phase);
            self.phase = next;
            self.stack.refresh_current(pos, networks, next);
        }

        let raw = networks.evaluate(self.stack.current(), self.phase, white_to_move);
        let ctx = ModifierContext::new(pos, ply, self.root_advantage);
        modifiers::trace(raw, &ctx, &self.params)
    }

    /// Rebuild the current accumulator if another network built it
    fn sync_network<B: BoardView + ?Sized>(&mut self, pos: &B) {
        let built_by = self.stack.current_phase();
        if built_by != self.phase {
            trace!("rebuilding {built_by} accumulator at ply {} for {}", self.stack.ply(), self.phase);
            self.stack.refresh_current(pos, self.networks, self.phase);
        }
    }

    /// Network currently selected for this line
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn params(&self) -> &EvalParams {
        &self.params
    }

    #[must_use]
    pub fn networks(&self) -> &'a NetworkSet {
        self.networks
    }

    #[inline]
    #[must_use]
    pub fn accumulator(&self) -> &Accumulator {
        self.stack.current()
    }

    #[inline]
    #[must_use]
    pub fn ply(&self) -> usize {
        self.stack.ply()
    }

    /// Side-to-move material advantage recorded at the root
    #[must_use]
    pub fn root_advantage(&self) -> i32 {
        self.root_advantage
    }

    /// Last depth at which the phase was re-detected
    #[must_use]
    pub fn last_checked_depth(&self) -> Option<i32> {
        self.detector.last_checked_depth()
    }
}
