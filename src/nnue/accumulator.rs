//! Hidden-layer accumulators and the per-line accumulator stack.
//!
//! An accumulator holds, for each perspective, the hidden bias plus the
//! weight rows of every active input feature. [`Accumulator::refresh`] is
//! the canonical definition; incremental updates must agree with it bit for
//! bit.

use crate::board::{occupied, BoardView};
use crate::types::{Color, MAX_PLY};

use super::features::{FeatureDelta, PieceSquare};
use super::network::{HiddenVector, Network};
use super::network_set::{NetworkSet, Phase};
use super::simd;

/// Pre-activation sums of the hidden layer for both perspectives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accumulator {
    /// White's perspective accumulator
    pub white: HiddenVector,
    /// Black's perspective accumulator
    pub black: HiddenVector,
}

impl Accumulator {
    #[must_use]
    pub const fn zeroed() -> Self {
        Accumulator {
            white: HiddenVector::ZERO,
            black: HiddenVector::ZERO,
        }
    }

    /// Create a new accumulator initialized with biases
    #[must_use]
    pub fn new(bias: &HiddenVector) -> Self {
        Accumulator {
            white: *bias,
            black: *bias,
        }
    }

    /// Build an accumulator for `pos` from scratch.
    #[must_use]
    pub fn from_position<B: BoardView + ?Sized>(pos: &B, network: &Network) -> Self {
        let mut acc = Self::zeroed();
        acc.refresh(pos, network);
        acc
    }

    /// Reset both perspectives to the given bias
    #[inline]
    pub fn init(&mut self, bias: &HiddenVector) {
        self.white = *bias;
        self.black = *bias;
    }

    #[inline]
    fn perspective_mut(&mut self, perspective: Color) -> &mut HiddenVector {
        match perspective {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Add or subtract one feature row on one perspective
    #[inline]
    pub fn update(&mut self, perspective: Color, feature: usize, add: bool, network: &Network) {
        let row = &network.feature_row(feature).0;
        let target = &mut self.perspective_mut(perspective).0;
        if add {
            simd::add_weights(target, row);
        } else {
            simd::sub_weights(target, row);
        }
    }

    /// Add a feature (piece placed on square) to both perspectives
    #[inline]
    pub fn add_feature(&mut self, ps: PieceSquare, network: &Network) {
        let (white, black) = ps.indices();
        simd::add_weights(&mut self.white.0, &network.feature_row(white).0);
        simd::add_weights(&mut self.black.0, &network.feature_row(black).0);
    }

    /// Remove a feature (piece removed from square) from both perspectives
    #[inline]
    pub fn remove_feature(&mut self, ps: PieceSquare, network: &Network) {
        let (white, black) = ps.indices();
        simd::sub_weights(&mut self.white.0, &network.feature_row(white).0);
        simd::sub_weights(&mut self.black.0, &network.feature_row(black).0);
    }

    /// Apply every change of a move
    #[inline]
    pub fn apply(&mut self, delta: &FeatureDelta, network: &Network) {
        for ps in delta.removed() {
            self.remove_feature(ps, network);
        }
        for ps in delta.added() {
            self.add_feature(ps, network);
        }
    }

    /// Rebuild from the bias and every piece on the board
    pub fn refresh<B: BoardView + ?Sized>(&mut self, pos: &B, network: &Network) {
        network.init_accumulator(self);
        for ps in occupied(pos) {
            self.add_feature(ps, network);
        }
    }
}

#[derive(Clone, Copy)]
struct Slot {
    acc: Accumulator,
    /// Phase whose network built `acc`
    phase: Phase,
}

/// One accumulator per ply of the current search line.
///
/// Slot 0 holds the root. Every slot remembers which phase's network built
/// it, so a line that switched networks can tell stale parents apart.
pub struct AccumulatorStack {
    slots: Box<[Slot]>,
    top: usize,
}

impl AccumulatorStack {
    /// Root slot plus one slot per supported ply
    pub const CAPACITY: usize = MAX_PLY + 1;

    #[must_use]
    pub fn new(root: Accumulator, phase: Phase) -> Self {
        AccumulatorStack {
            slots: vec![Slot { acc: root, phase }; Self::CAPACITY].into_boxed_slice(),
            top: 0,
        }
    }

    /// A stack whose root is rebuilt from `pos` with `phase`'s network
    #[must_use]
    pub fn from_position<B: BoardView + ?Sized>(pos: &B, networks: &NetworkSet, phase: Phase) -> Self {
        Self::new(Accumulator::from_position(pos, networks.get(phase)), phase)
    }

    /// Drop every ply and install a new root
    pub fn reset(&mut self, root: Accumulator, phase: Phase) {
        self.top = 0;
        self.slots[0] = Slot { acc: root, phase };
    }

    /// Number of pushes since the root
    #[inline]
    #[must_use]
    pub fn ply(&self) -> usize {
        self.top
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> &Accumulator {
        &self.slots[self.top].acc
    }

    /// Phase whose network built the current accumulator
    #[inline]
    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.slots[self.top].phase
    }

    #[inline]
    fn advance(&mut self) {
        assert!(
            self.top + 1 < Self::CAPACITY,
            "accumulator stack overflow: cannot search beyond {MAX_PLY} plies"
        );
        self.top += 1;
    }

    /// Copy the current accumulator to the next ply and apply a move's delta.
    ///
    /// The delta is applied with the network that built the copied slot.
    ///
    /// # Panics
    /// Panics if the stack already holds `MAX_PLY` plies.
    #[inline]
    pub fn push(&mut self, delta: &FeatureDelta, networks: &NetworkSet) {
        self.advance();
        self.slots.copy_within(self.top - 1..self.top, self.top);
        let slot = &mut self.slots[self.top];
        slot.acc.apply(delta, networks.get(slot.phase));
    }

    /// Advance one ply, rebuilding the new slot from `pos` instead of copying.
    ///
    /// # Panics
    /// Panics if the stack already holds `MAX_PLY` plies.
    pub fn push_refreshed<B: BoardView + ?Sized>(&mut self, pos: &B, networks: &NetworkSet, phase: Phase) {
        self.advance();
        self.refresh_current(pos, networks, phase);
    }

    /// Return to the previous ply. No recomputation takes place.
    ///
    /// # Panics
    /// Panics when already at the root.
    #[inline]
    pub fn pop(&mut self) {
        assert!(self.top > 0, "accumulator stack underflow: pop at the root");
        self.top -= 1;
    }

    /// Rebuild the current slot from `pos` with `phase`'s network
    pub fn refresh_current<B: BoardView + ?Sized>(&mut self, pos: &B, networks: &NetworkSet, phase: Phase) {
        let slot = &mut self.slots[self.top];
        slot.acc.refresh(pos, networks.get(phase));
        slot.phase = phase;
    }
}
