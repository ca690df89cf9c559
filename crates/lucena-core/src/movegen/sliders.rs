//! Bishop, rook, and queen move generation.

use crate::attacks::{bishop_attacks, line, queen_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::Move;
use crate::piece::PieceKind;
use crate::square::Square;

use super::MoveList;

pub(super) fn gen_sliders(
    board: &Board,
    king_sq: Square,
    pinned: Bitboard,
    target_mask: Bitboard,
    list: &mut MoveList,
) {
    gen_kind(board, king_sq, pinned, target_mask, list, PieceKind::Bishop, |sq, occ| {
        bishop_attacks(sq, occ)
    });
    gen_kind(board, king_sq, pinned, target_mask, list, PieceKind::Rook, |sq, occ| {
        rook_attacks(sq, occ)
    });
    gen_kind(board, king_sq, pinned, target_mask, list, PieceKind::Queen, |sq, occ| {
        queen_attacks(sq, occ)
    });
}

fn gen_kind(
    board: &Board,
    king_sq: Square,
    pinned: Bitboard,
    target_mask: Bitboard,
    list: &mut MoveList,
    kind: PieceKind,
    attacks: impl Fn(Square, Bitboard) -> Bitboard,
) {
    let us = board.side_to_move();
    let occupied = board.occupied();

    for src in board.pieces(kind) & board.side(us) {
        let mut targets = attacks(src, occupied) & target_mask;
        // A pinned slider may only slide along the pin ray.
        if pinned.contains(src) {
            targets &= line(king_sq, src);
        }
        for dst in targets {
            list.push(Move::new(src, dst));
        }
    }
}
