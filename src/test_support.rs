//! Helpers shared by the unit test suites.

use rand::prelude::*;

use crate::board::{Board, BoardView, Move, UnmakeInfo};
use crate::nnue::{FeatureDelta, HiddenVector, Network, NetworkParams, NetworkSet};
use crate::types::{Piece, Square};

fn random_vector(rng: &mut StdRng, range: std::ops::RangeInclusive<i16>) -> HiddenVector {
    let mut v = HiddenVector::ZERO;
    for w in v.0.iter_mut() {
        *w = rng.gen_range(range.clone());
    }
    v
}

/// A network with small random weights, deterministic in `seed`.
pub(crate) fn random_network(seed: u64) -> Network {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut params = NetworkParams::zeroed();
    for row in params.feature_weights.iter_mut() {
        *row = random_vector(&mut rng, -64..=64);
    }
    params.hidden_bias = random_vector(&mut rng, -32..=96);
    params.output_weights = [random_vector(&mut rng, -48..=48), random_vector(&mut rng, -48..=48)];
    params.output_bias = rng.gen_range(-200..=200);
    Network::new(params)
}

/// Random feature weights, but a constant output: zero output weights leave
/// only `bias * 400 / 16320`.
pub(crate) fn constant_output_network(seed: u64, bias: i16) -> Network {
    let mut params = random_network(seed).params().clone();
    params.output_weights = [HiddenVector::ZERO; 2];
    params.output_bias = bias;
    Network::new(params)
}

/// Three distinct random networks.
pub(crate) fn random_network_set(seed: u64) -> NetworkSet {
    NetworkSet::new(
        random_network(seed),
        random_network(seed.wrapping_add(1)),
        random_network(seed.wrapping_add(2)),
    )
}

/// Play a random pseudo-move for the side to move.
///
/// Any own piece may jump to any square not held by its own side, and pawns
/// reaching the last rank promote to a random piece. Returns `None` when the
/// chosen move is rejected by the board.
pub(crate) fn play_random_move(board: &mut Board, rng: &mut StdRng) -> Option<(FeatureDelta, UnmakeInfo)> {
    let side = board.side_to_move();
    let own: Vec<Square> = Square::all()
        .filter(|&sq| matches!(board.piece_on(sq), Some((c, _)) if c == side))
        .collect();
    let from = *own.choose(rng)?;
    let targets: Vec<Square> = Square::all()
        .filter(|&sq| sq != from && !matches!(board.piece_on(sq), Some((c, _)) if c == side))
        .collect();
    let to = *targets.choose(rng)?;

    let promotes = board.piece_on(from) == Some((side, Piece::Pawn)) && (to.rank() == 0 || to.rank() == 7);
    let mv = if promotes {
        let piece = *[Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen].choose(rng)?;
        Move::with_promotion(from, to, piece)
    } else {
        Move::new(from, to)
    };
    board.make_move(mv).ok()
}
