//! End-to-end tactical regression suite: position in, best move out.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use lucena_core::{Board, generate_moves, move_from_uci};
use lucena_engine::{
    MATE_THRESHOLD, SearchLimits, SearchReport, TranspositionTable, search,
};

fn best_move(fen: &str, depth: u8) -> SearchReport {
    let mut board: Board = fen.parse().unwrap();
    let mut tt = TranspositionTable::with_megabytes(16);
    search(
        &mut board,
        &mut tt,
        &SearchLimits::depth(depth),
        Arc::new(AtomicBool::new(false)),
    )
}

#[test]
fn smothered_corner_mate() {
    // Nf7# against the cornered king.
    let report = best_move("6rk/6pp/7N/8/8/8/8/6K1 w - - 0 1", 4);
    assert!(report.score > MATE_THRESHOLD);
}

#[test]
fn doubled_rooks_deliver_back_rank_mate() {
    // Ra8# against the pawn-boxed king.
    let report = best_move("6k1/5ppp/8/8/8/8/8/RR4K1 w - - 0 1", 4);
    assert!(report.score > MATE_THRESHOLD, "score {}", report.score);
    // Either rook mates on the eighth.
    let mv = report.best_move.unwrap().to_uci();
    assert!(mv == "a1a8" || mv == "b1b8", "unexpected mating move {mv}");
}

#[test]
fn hanging_queen_gets_taken() {
    // A queen en prise to a pawn: any sane search grabs it.
    let report = best_move("rnb1kbnr/pppp1ppp/8/4p3/4q3/3P4/PPP1PPPP/RNBQKBNR w KQkq - 0 1", 4);
    assert_eq!(report.best_move.unwrap().to_uci(), "d3e4");
}

#[test]
fn search_does_not_mutate_the_position() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let mut board: Board = fen.parse().unwrap();
    let snapshot = board.clone();
    let mut tt = TranspositionTable::with_megabytes(8);
    search(
        &mut board,
        &mut tt,
        &SearchLimits::depth(4),
        Arc::new(AtomicBool::new(false)),
    );
    assert_eq!(board, snapshot, "search must unwind every move it makes");
}

#[test]
fn best_move_is_always_legal() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
    ];
    for fen in fens {
        let report = best_move(fen, 4);
        let board: Board = fen.parse().unwrap();
        let mv = report.best_move.expect("live position has a best move");
        assert!(generate_moves(&board).contains(mv), "{} illegal in {fen}", mv);
    }
}

#[test]
fn coordinate_notation_round_trips_through_a_game() {
    // Play a short game through the text interface the way a host
    // protocol would: string to move, move applied, repeat.
    let line = ["e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6"];
    let mut board = Board::starting_position();
    for text in line {
        let mv = move_from_uci(&board, text).expect("book move is legal");
        assert_eq!(mv.to_uci(), text);
        board.do_move(mv);
    }
    assert_eq!(board.fullmove_number(), 5);
}

#[test]
fn deeper_search_never_worsens_a_winning_score() {
    // With an extra rook, deeper iterations must keep the score clearly
    // positive (sanity check on TT reuse across depths).
    let fen = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1";
    for depth in [2, 4, 6] {
        let report = best_move(fen, depth);
        assert!(
            report.score > 300,
            "depth {depth} scored {} with a clean extra rook",
            report.score
        );
    }
}
