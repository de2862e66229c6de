use rand::prelude::*;

use crate::board::{Board, BoardView, Move};
use crate::eval::modifiers::{self, ModifierContext};
use crate::eval::{EvalParams, EvaluationState};
use crate::nnue::{Accumulator, HiddenVector, Network, NetworkParams, NetworkSet, Phase};
use crate::test_support::{constant_output_network, play_random_move, random_network, random_network_set};

/// A network that ignores the board and scores `bias * 400 / 16320`
fn constant(bias: i16) -> Network {
    let mut params = NetworkParams::zeroed();
    params.output_bias = bias;
    Network::new(params)
}

fn play(board: &mut Board, state: &mut EvaluationState<'_>, mv: &str) {
    let (delta, _) = board.make_move(mv.parse::<Move>().unwrap()).unwrap();
    state.push(board, &delta);
}

#[test]
fn new_state_starts_in_middlegame_at_the_root() {
    let networks = random_network_set(1);
    let board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR b KQkq - 0 1");
    let state = EvaluationState::new(&networks, &board);

    assert_eq!(state.phase(), Phase::Middlegame);
    assert_eq!(state.ply(), 0);
    assert_eq!(state.root_advantage(), 900);
    assert_eq!(
        *state.accumulator(),
        Accumulator::from_position(&board, networks.get(Phase::Middlegame))
    );
}

#[test]
fn init_resets_phase_and_depth_memo() {
    let networks = NetworkSet::new(constant(-10_000), constant(0), constant(0));
    let mut board = Board::new();
    let mut state = EvaluationState::new(&networks, &board);

    play(&mut board, &mut state, "e2e4");
    state.evaluate(&board, 6, 1);
    assert_eq!(state.phase(), Phase::Endgame);
    assert_eq!(state.last_checked_depth(), Some(6));

    state.init(&board);
    assert_eq!(state.phase(), Phase::Middlegame);
    assert_eq!(state.ply(), 0);
    assert_eq!(state.last_checked_depth(), None);
}

#[test]
fn shallow_depths_never_switch() {
    let networks = NetworkSet::new(constant(-10_000), constant(0), constant(0));
    let board = Board::new();
    let mut state = EvaluationState::new(&networks, &board);

    for depth in 0..6 {
        state.evaluate(&board, depth, 0);
        assert_eq!(state.phase(), Phase::Middlegame);
    }
    assert_eq!(state.last_checked_depth(), None);
}

#[test]
fn switch_to_endgame_rebuilds_with_the_endgame_network() {
    let networks = NetworkSet::new(constant(-10_000), random_network(21), random_network(22));
    let mut board = Board::new();
    let mut state = EvaluationState::new(&networks, &board);
    play(&mut board, &mut state, "e2e4");
    play(&mut board, &mut state, "e7e5");

    let score = state.evaluate(&board, 6, 2);

    assert_eq!(state.phase(), Phase::Endgame);
    let rebuilt = Accumulator::from_position(&board, networks.get(Phase::Endgame));
    assert_eq!(*state.accumulator(), rebuilt);

    let raw = networks.evaluate(&rebuilt, Phase::Endgame, board.white_to_move());
    let ctx = ModifierContext::new(&board, 2, 0);
    assert_eq!(score, modifiers::apply(raw, &ctx, &EvalParams::default()));
}

#[test]
fn high_preliminary_score_selects_sacrifice() {
    let networks = NetworkSet::new(constant(20_000), constant(0), constant(0));
    let board = Board::new();
    let mut state = EvaluationState::new(&networks, &board);

    state.evaluate(&board, 9, 0);
    assert_eq!(state.phase(), Phase::Sacrifice);
}

#[test]
fn phase_is_checked_once_per_depth() {
    let networks = NetworkSet::new(constant(-10_000), constant(0), constant(0));
    let board = Board::new();
    let mut state = EvaluationState::new(&networks, &board);

    state.evaluate(&board, 6, 0);
    assert_eq!(state.phase(), Phase::Endgame);

    // The endgame network alone would call this a middlegame, but depth 6
    // was already checked.
    state.evaluate(&board, 6, 0);
    assert_eq!(state.phase(), Phase::Endgame);

    state.evaluate(&board, 7, 0);
    assert_eq!(state.phase(), Phase::Middlegame);
    assert_eq!(
        *state.accumulator(),
        Accumulator::from_position(&board, networks.get(Phase::Middlegame))
    );
}

#[test]
fn stale_parents_are_rebuilt_after_a_switch() {
    let networks = NetworkSet::new(
        constant_output_network(31, -10_000),
        random_network(32),
        random_network(33),
    );
    let mut board = Board::new();
    let mut state = EvaluationState::new(&networks, &board);

    let (d1, u1) = board.make_move("g1f3".parse().unwrap()).unwrap();
    state.push(&board, &d1);
    let (d2, u2) = board.make_move("d7d5".parse().unwrap()).unwrap();
    state.push(&board, &d2);

    state.evaluate(&board, 8, 2);
    assert_eq!(state.phase(), Phase::Endgame);

    // Back at ply 1 the slot was built by the middlegame network
    board.unmake_move(u2);
    state.pop();
    state.evaluate(&board, 8, 1);
    assert_eq!(
        *state.accumulator(),
        Accumulator::from_position(&board, networks.get(Phase::Endgame))
    );

    // Pushing from a stale parent must not mix networks either
    board.unmake_move(u1);
    state.pop();
    let (d3, _) = board.make_move("e2e4".parse().unwrap()).unwrap();
    state.push(&board, &d3);
    assert_eq!(
        *state.accumulator(),
        Accumulator::from_position(&board, networks.get(Phase::Endgame))
    );
}

#[test]
fn decisive_raw_scores_skip_the_modifiers() {
    let mut params = NetworkParams::zeroed();
    params.hidden_bias = HiddenVector([255; crate::nnue::HIDDEN_SIZE]);
    params.output_weights = [HiddenVector([100; crate::nnue::HIDDEN_SIZE]); 2];
    let huge = Network::new(params);
    let networks = NetworkSet::new(huge.clone(), huge.clone(), huge);

    let mut board = Board::new();
    board.set_halfmove_clock(150);
    let mut state = EvaluationState::new(&networks, &board);

    let t = state.evaluate_traced(&board, 0, 0);
    assert!(t.bypassed);
    assert_eq!(t.final_score, t.raw);
    assert_eq!(t.raw, networks.evaluate(state.accumulator(), Phase::Middlegame, true));
}

#[test]
fn free_functions_drive_the_state() {
    let networks = random_network_set(41);
    let mut board = Board::new();
    let mut state = EvaluationState::new(&networks, &board);
    crate::eval::init_state(&mut state, &board);

    let (delta, info) = board.make_move("b1c3".parse().unwrap()).unwrap();
    crate::eval::push(&mut state, &board, &delta);
    let after = crate::eval::evaluate(&board, &mut state, 1, 1);
    assert_eq!(after, state.evaluate(&board, 1, 1));

    board.unmake_move(info);
    crate::eval::pop(&mut state);
    assert_eq!(state.ply(), 0);
    assert_eq!(
        *state.accumulator(),
        Accumulator::from_position(&board, networks.get(Phase::Middlegame))
    );
}

#[test]
fn long_random_line_matches_rebuild_at_every_ply() {
    let networks = random_network_set(51);
    let mut rng = StdRng::seed_from_u64(52);
    let mut board = Board::new();
    let mut state = EvaluationState::new(&networks, &board);

    for _ in 0..120 {
        if let Some((delta, _)) = play_random_move(&mut board, &mut rng) {
            state.push(&board, &delta);
            assert_eq!(
                *state.accumulator(),
                Accumulator::from_position(&board, networks.get(Phase::Middlegame))
            );
        }
    }
}

#[test]
#[should_panic(expected = "underflow")]
fn pop_at_root_panics() {
    let networks = NetworkSet::zeroed();
    let board = Board::new();
    let mut state = EvaluationState::new(&networks, &board);
    state.pop();
}

#[test]
fn clock_at_horizon_scores_zero() {
    // Raw score 5000 * 400 / 16320 = 122 on every network
    let networks = NetworkSet::new(constant(5000), constant(5000), constant(5000));
    let mut board = Board::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");
    board.set_halfmove_clock(200);
    let mut state = EvaluationState::new(&networks, &board);

    let t = state.evaluate_traced(&board, 3, 0);
    assert!(!t.bypassed);
    assert_eq!(t.raw, 122);
    assert_ne!(t.scaled, 0);
    assert_eq!(t.final_score, 0);
}
