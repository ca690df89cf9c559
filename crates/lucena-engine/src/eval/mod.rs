//! Static evaluation: material plus piece-square positional bonuses.

mod pst;

use lucena_core::{Board, Color, PieceKind};

/// Material values in centipawns, indexed by [`PieceKind::index()`].
/// Kings carry no material value (they are never off the board).
pub const MATERIAL: [i32; 6] = [100, 320, 330, 500, 900, 0];

/// The material value of a piece kind.
#[inline]
pub const fn piece_value(kind: PieceKind) -> i32 {
    MATERIAL[kind.index()]
}

/// Evaluate a position, returning centipawns from the side to move's
/// point of view (negamax convention).
///
/// Pure material and piece-square terms: no side effects, no allocation,
/// identical output for identical input.
pub fn evaluate(board: &Board) -> i32 {
    let mut score = 0;

    for kind in PieceKind::ALL {
        let value = piece_value(kind);
        let table = pst::table(kind);
        for sq in board.pieces(kind) & board.side(Color::White) {
            score += value + table[sq.index()];
        }
        for sq in board.pieces(kind) & board.side(Color::Black) {
            score -= value + table[sq.index() ^ 56];
        }
    }

    match board.side_to_move() {
        Color::White => score,
        Color::Black => -score,
    }
}
