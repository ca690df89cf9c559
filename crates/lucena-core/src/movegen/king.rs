//! King move and castling generation.

use crate::attacks::king_attacks;
use crate::board::Board;
use crate::castling::CastleRights;
use crate::chess_move::Move;
use crate::color::Color;
use crate::square::Square;

use super::MoveList;

pub(super) fn gen_king(
    board: &Board,
    king_sq: Square,
    in_check: bool,
    tactical: bool,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let them = us.flip();
    let friendly = board.side(us);
    // The king is removed from the blocker set so sliders X-ray through it;
    // otherwise stepping away along the attack ray would look safe.
    let occ_without_king = board.occupied() ^ king_sq.bitboard();

    let targets = if tactical {
        king_attacks(king_sq) & board.side(them)
    } else {
        king_attacks(king_sq) & !friendly
    };
    for dst in targets {
        if !board.is_square_attacked_with_occ(dst, them, occ_without_king) {
            list.push(Move::new(king_sq, dst));
        }
    }

    // Castling is never tactical and never legal out of check.
    if tactical || in_check {
        return;
    }

    let occupied = board.occupied();
    let castling = board.castling();
    let clear = |sq: Square| !occupied.contains(sq);
    let safe = |sq: Square| !board.is_square_attacked(sq, them);

    match us {
        Color::White => {
            if castling.contains(CastleRights::WHITE_KING)
                && clear(Square::F1)
                && clear(Square::G1)
                && safe(Square::F1)
                && safe(Square::G1)
            {
                list.push(Move::castle(Square::E1, Square::G1));
            }
            // B1 must be clear for the rook but may be attacked.
            if castling.contains(CastleRights::WHITE_QUEEN)
                && clear(Square::B1)
                && clear(Square::C1)
                && clear(Square::D1)
                && safe(Square::C1)
                && safe(Square::D1)
            {
                list.push(Move::castle(Square::E1, Square::C1));
            }
        }
        Color::Black => {
            if castling.contains(CastleRights::BLACK_KING)
                && clear(Square::F8)
                && clear(Square::G8)
                && safe(Square::F8)
                && safe(Square::G8)
            {
                list.push(Move::castle(Square::E8, Square::G8));
            }
            if castling.contains(CastleRights::BLACK_QUEEN)
                && clear(Square::B8)
                && clear(Square::C8)
                && clear(Square::D8)
                && safe(Square::C8)
                && safe(Square::D8)
            {
                list.push(Move::castle(Square::E8, Square::C8));
            }
        }
    }
}
