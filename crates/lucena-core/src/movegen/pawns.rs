//! Pawn move generation: pushes, captures, promotions, en passant.

use crate::attacks::{bishop_attacks, line, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::{Move, PromotionPiece};
use crate::color::Color;
use crate::piece::PieceKind;
use crate::square::Square;

use super::MoveList;

#[allow(clippy::too_many_arguments)]
pub(super) fn gen_pawns(
    board: &Board,
    king_sq: Square,
    pinned: Bitboard,
    check_mask: Bitboard,
    capture_mask: Bitboard,
    quiet_mask: Bitboard,
    promo_push_mask: Bitboard,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let them = us.flip();
    let our_pawns = board.pieces(PieceKind::Pawn) & board.side(us);
    let empty = !board.occupied();

    let (push, promo_rank, double_rank): (i8, Bitboard, Bitboard) = match us {
        Color::White => (8, Bitboard::RANK_8, Bitboard::RANK_4),
        Color::Black => (-8, Bitboard::RANK_1, Bitboard::RANK_5),
    };

    let single = match us {
        Color::White => (our_pawns << 8) & empty,
        Color::Black => (our_pawns >> 8) & empty,
    };

    // Quiet single pushes (suppressed entirely in tactical generation).
    for dst in single & !promo_rank & quiet_mask {
        let src = Square::from_index_unchecked((dst.index() as i8 - push) as u8);
        if !pinned.contains(src) || line(king_sq, src).contains(dst) {
            list.push(Move::new(src, dst));
        }
    }

    // Promotion pushes count as tactical, so they use their own mask.
    for dst in single & promo_rank & promo_push_mask {
        let src = Square::from_index_unchecked((dst.index() as i8 - push) as u8);
        if !pinned.contains(src) || line(king_sq, src).contains(dst) {
            for promo in PromotionPiece::ALL {
                list.push(Move::promotion(src, dst, promo));
            }
        }
    }

    // Double pushes through an empty intermediate square.
    let double = match us {
        Color::White => (single << 8) & empty,
        Color::Black => (single >> 8) & empty,
    };
    for dst in double & double_rank & quiet_mask {
        let src = Square::from_index_unchecked((dst.index() as i8 - 2 * push) as u8);
        if !pinned.contains(src) || line(king_sq, src).contains(dst) {
            list.push(Move::new(src, dst));
        }
    }

    // Captures, with pinned pawns held to the pin ray.
    for src in our_pawns {
        for dst in pawn_attacks(us, src) & capture_mask {
            if pinned.contains(src) && !line(king_sq, src).contains(dst) {
                continue;
            }
            if promo_rank.contains(dst) {
                for promo in PromotionPiece::ALL {
                    list.push(Move::promotion(src, dst, promo));
                }
            } else {
                list.push(Move::new(src, dst));
            }
        }
    }

    // En passant.
    let Some(ep_sq) = board.en_passant() else {
        return;
    };
    let captured_sq = Square::from_index_unchecked(match us {
        Color::White => ep_sq.index() as u8 - 8,
        Color::Black => ep_sq.index() as u8 + 8,
    });

    for src in pawn_attacks(them, ep_sq) & our_pawns {
        // In check the capture must block the ray or take the checker.
        // (With no check, check_mask is the full board.)
        if !check_mask.contains(ep_sq) && !check_mask.contains(captured_sq) {
            continue;
        }
        if pinned.contains(src) && !line(king_sq, src).contains(ep_sq) {
            continue;
        }

        // Both pawns leave their squares at once, so re-cast slider rays
        // from the king over the post-capture occupancy. The horizontal
        // case is the classic "pseudo-pin"; the diagonal ray covers a
        // discovered check through the captured pawn's square.
        let after = (board.occupied() ^ src.bitboard() ^ captured_sq.bitboard()) | ep_sq.bitboard();
        let theirs = board.side(them);
        let rook_like = (board.pieces(PieceKind::Rook) | board.pieces(PieceKind::Queen)) & theirs;
        if (rook_attacks(king_sq, after) & rook_like).is_nonempty() {
            continue;
        }
        let bishop_like =
            (board.pieces(PieceKind::Bishop) | board.pieces(PieceKind::Queen)) & theirs;
        if (bishop_attacks(king_sq, after) & bishop_like).is_nonempty() {
            continue;
        }

        list.push(Move::en_passant(src, ep_sq));
    }
}
