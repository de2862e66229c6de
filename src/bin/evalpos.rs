use std::env;
use std::process;

use phased_nnue::board::{Board, BoardView, Move};
use phased_nnue::eval::EvaluationState;
use phased_nnue::nnue::NetworkSet;

const USAGE: &str =
    "usage: evalpos <middlegame.nnue> <endgame.nnue> <sacrifice.nnue> [--fen <fen>] [--depth <n>] [moves...]";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("{USAGE}");
        process::exit(2);
    }

    let mut networks = NetworkSet::zeroed();
    if !networks.load_files([&args[0], &args[1], &args[2]]) {
        eprintln!("failed to load networks");
        process::exit(1);
    }

    let mut board = Board::new();
    let mut depth = 0;
    let mut moves: Vec<&str> = Vec::new();
    let mut rest = args[3..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--fen" => {
                let Some(fen) = rest.next() else {
                    eprintln!("--fen needs a value");
                    process::exit(2);
                };
                board = match Board::try_from_fen(fen) {
                    Ok(board) => board,
                    Err(err) => {
                        eprintln!("bad fen: {err}");
                        process::exit(2);
                    }
                };
            }
            "--depth" => {
                depth = match rest.next().map(|d| d.parse::<i32>()) {
                    Some(Ok(d)) => d,
                    _ => {
                        eprintln!("--depth needs an integer");
                        process::exit(2);
                    }
                };
            }
            mv => moves.push(mv),
        }
    }

    let mut state = EvaluationState::new(&networks, &board);
    for mv in &moves {
        let played = mv
            .parse::<Move>()
            .map_err(|err| err.to_string())
            .and_then(|mv| board.make_move(mv).map_err(|err| err.to_string()));
        match played {
            Ok((delta, _)) => state.push(&board, &delta),
            Err(err) => {
                eprintln!("cannot play {mv}: {err}");
                process::exit(2);
            }
        }
    }

    let ply = state.ply();
    let t = state.evaluate_traced(&board, depth, ply);
    println!("fen: {}", board.to_fen());
    println!(
        "side_to_move: {}",
        if board.white_to_move() { "white" } else { "black" }
    );
    println!("phase: {}", state.phase());
    println!("raw: {}", t.raw);
    if t.bypassed {
        println!("decisive score, modifiers skipped");
    } else {
        println!("better_than_material: {}", t.better_than_material);
        println!("sacrifice_bonus: {}", t.sacrifice_bonus);
        println!("scaled: {}", t.scaled);
        println!("contempt: {}", t.contempt);
    }
    println!("final: {}", t.final_score);
}
