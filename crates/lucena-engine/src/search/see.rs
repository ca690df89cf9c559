//! Static Exchange Evaluation.
//!
//! Resolves the capture sequence on one square without touching the real
//! position: attackers are consumed least-valuable-first on a scratch
//! occupancy, X-ray attackers join as blockers disappear, and a backward
//! minimax over the gain ladder lets either side stand pat early.

use lucena_core::{
    Bitboard, Board, Color, Move, MoveKind, PieceKind, Square, attacks,
};

/// Exchange values, indexed by [`PieceKind::index()`]. The king's value
/// only matters as "never worth capturing into".
const SEE_VALUE: [i32; 6] = [100, 320, 330, 500, 900, 20_000];

/// Every piece of either color attacking `sq` under the occupancy `occ`.
fn attackers_of(board: &Board, sq: Square, occ: Bitboard) -> Bitboard {
    let knights = attacks::knight_attacks(sq) & board.pieces(PieceKind::Knight);
    let kings = attacks::king_attacks(sq) & board.pieces(PieceKind::King);
    let rook_like = attacks::rook_attacks(sq, occ)
        & (board.pieces(PieceKind::Rook) | board.pieces(PieceKind::Queen));
    let bishop_like = attacks::bishop_attacks(sq, occ)
        & (board.pieces(PieceKind::Bishop) | board.pieces(PieceKind::Queen));
    let white_pawns = attacks::pawn_attacks(Color::Black, sq)
        & board.pieces(PieceKind::Pawn)
        & board.side(Color::White);
    let black_pawns = attacks::pawn_attacks(Color::White, sq)
        & board.pieces(PieceKind::Pawn)
        & board.side(Color::Black);

    knights | kings | rook_like | bishop_like | white_pawns | black_pawns
}

/// The cheapest attacker of `side` within `attackers`, scanning piece
/// kinds from pawn upward.
fn least_valuable_attacker(
    board: &Board,
    attackers: Bitboard,
    side: Color,
) -> Option<(Square, PieceKind)> {
    let side_bb = board.side(side);
    for kind in PieceKind::ALL {
        if let Some(sq) = (attackers & side_bb & board.pieces(kind)).lsb() {
            return Some((sq, kind));
        }
    }
    None
}

/// Net material outcome of playing `mv` and letting both sides recapture
/// optimally on the destination square. Positive means the mover comes
/// out ahead. Read-only with respect to the board.
pub fn see(board: &Board, mv: Move) -> i32 {
    let src = mv.source();
    let dst = mv.dest();
    let mut occ = board.occupied();

    let attacker_kind = board.piece_on(src).unwrap_or(PieceKind::Pawn);

    let first_victim = if mv.kind() == MoveKind::EnPassant {
        SEE_VALUE[PieceKind::Pawn.index()]
    } else {
        board.piece_on(dst).map_or(0, |kind| SEE_VALUE[kind.index()])
    };

    // After the first capture, the piece standing on dst (and thus the
    // next victim) is the mover — or what it promoted into.
    let mut on_square = if mv.kind() == MoveKind::Promotion {
        SEE_VALUE[mv.promotion_piece().piece_kind().index()]
    } else {
        SEE_VALUE[attacker_kind.index()]
    };

    occ = occ.without(src);
    if mv.kind() == MoveKind::EnPassant {
        let victim_idx = match board.side_to_move() {
            Color::White => dst.index() - 8,
            Color::Black => dst.index() + 8,
        };
        if let Some(victim_sq) = Square::from_index(victim_idx as u8) {
            occ = occ.without(victim_sq);
        }
    }

    let mut gain = [0i32; 32];
    let mut depth = 0usize;
    gain[0] = first_victim;

    let mut side = board.side_to_move().flip();
    let mut attackers = attackers_of(board, dst, occ) & occ;

    loop {
        let Some((sq, kind)) = least_valuable_attacker(board, attackers, side) else {
            break;
        };

        depth += 1;
        if depth >= gain.len() {
            break;
        }
        gain[depth] = on_square - gain[depth - 1];

        on_square = SEE_VALUE[kind.index()];
        occ = occ.without(sq);

        // Removing a blocker may expose a slider behind it.
        if matches!(kind, PieceKind::Pawn | PieceKind::Bishop | PieceKind::Queen) {
            attackers |= attacks::bishop_attacks(dst, occ)
                & (board.pieces(PieceKind::Bishop) | board.pieces(PieceKind::Queen));
        }
        if matches!(kind, PieceKind::Rook | PieceKind::Queen) {
            attackers |= attacks::rook_attacks(dst, occ)
                & (board.pieces(PieceKind::Rook) | board.pieces(PieceKind::Queen));
        }
        attackers &= occ;

        side = side.flip();
    }

    // Backward minimax: each side may decline to continue the exchange.
    while depth > 0 {
        depth -= 1;
        gain[depth] = -((-gain[depth]).max(gain[depth + 1]));
    }

    gain[0]
}
