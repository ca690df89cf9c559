//! Knight move generation.

use crate::attacks::knight_attacks;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::Move;
use crate::piece::PieceKind;

use super::MoveList;

pub(super) fn gen_knights(
    board: &Board,
    pinned: Bitboard,
    target_mask: Bitboard,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let knights = board.pieces(PieceKind::Knight) & board.side(us);

    // A pinned knight can never stay on its pin ray.
    for src in knights & !pinned {
        for dst in knight_attacks(src) & target_mask {
            list.push(Move::new(src, dst));
        }
    }
}
