//! Fail-soft principal variation search with quiescence.

use lucena_core::{Board, Move, MoveKind, PieceKind, generate_captures, generate_moves};

use crate::eval::evaluate;
use crate::search::control::SearchControl;
use crate::search::pq::MovePriorityQueue;
use crate::search::see::see;
use crate::search::tt::{Bound, TranspositionTable};

/// Upper bound on any score.
pub const INF: i32 = 30_000;

/// Mate delivered at the root; a mate at ply `p` scores `MATE_SCORE - p`,
/// so faster mates order first.
pub const MATE_SCORE: i32 = 29_000;

/// Scores beyond this are forced mates.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Recursion ceiling, including extensions and quiescence.
pub const MAX_PLY: usize = 128;

/// Depth taken off the null-move search in addition to the normal ply.
const NULL_MOVE_REDUCTION: u8 = 2;

/// Static null-move margin per ply of remaining depth (roughly a pawn).
const STATIC_NULL_MARGIN: i32 = 88;

/// Safety margin for delta pruning in quiescence: a capture may pay off
/// positionally even when the material alone cannot raise alpha.
const DELTA_MARGIN: i32 = 150;

/// Mutable search state threaded through the recursion.
pub(crate) struct SearchContext<'a> {
    pub board: &'a mut Board,
    pub tt: &'a mut TranspositionTable,
    pub control: &'a SearchControl,
    pub nodes: u64,
    pub seldepth: usize,
}

/// King-and-pawn endgames are zugzwang country: the null-move
/// observation ("doing nothing is never best") stops holding.
pub(crate) fn is_pawn_endgame(board: &Board) -> bool {
    (board.pieces(PieceKind::Knight)
        | board.pieces(PieceKind::Bishop)
        | board.pieces(PieceKind::Rook)
        | board.pieces(PieceKind::Queen))
    .is_empty()
}

/// Principal variation search.
///
/// Fail-soft: returns the best score found even outside (alpha, beta).
/// On abort every frame returns the neutral sentinel 0 and nothing is
/// written to the transposition table.
pub(crate) fn pvs(
    ctx: &mut SearchContext<'_>,
    depth: u8,
    ply: usize,
    allow_null: bool,
    mut alpha: i32,
    mut beta: i32,
) -> i32 {
    ctx.nodes += 1;
    ctx.seldepth = ctx.seldepth.max(ply);

    if ply >= MAX_PLY {
        return evaluate(ctx.board);
    }
    if ctx.control.should_stop(ctx.nodes) {
        return 0;
    }

    let in_check = ctx.board.in_check();

    // Draw detection: fifty-move rule (unless the clock ran out on a
    // mating move) and repetition of an earlier position.
    if ply > 0 {
        if ctx.board.halfmove_clock() >= 100 && !in_check {
            return 0;
        }
        if ctx.board.repetitions() >= 2 {
            return 0;
        }
    }

    // Check extension: don't let a forcing sequence fall off the horizon.
    let depth = if in_check { depth.saturating_add(1) } else { depth };

    if depth == 0 {
        return quiesce(ctx, ply, 0, alpha, beta);
    }

    // Transposition table probe. An exact hit at sufficient depth is
    // returned outright; bound hits either cut off or tighten the window.
    let mut hash_move = Move::NULL;
    if let Some(hit) = ctx.tt.probe(ctx.board.hash(), ply as u8) {
        hash_move = hit.best_move;
        if hit.depth >= depth {
            match hit.bound {
                Bound::Exact => return hit.score,
                Bound::Lower => {
                    if hit.score >= beta {
                        return hit.score;
                    }
                    alpha = alpha.max(hit.score);
                }
                Bound::Upper => {
                    if hit.score <= alpha {
                        return hit.score;
                    }
                    beta = beta.min(hit.score);
                }
            }
        }
    }

    // Static null move: if the standing evaluation beats beta by a
    // depth-scaled margin, trust the cutoff without searching.
    if !in_check {
        let score = evaluate(ctx.board) - STATIC_NULL_MARGIN * depth as i32;
        if score >= beta {
            return score;
        }
    }

    // Null move: hand the opponent a free move; if they still cannot
    // reach beta, the position is good enough to cut. Skipped in check,
    // at low depth, and in pawn endgames (zugzwang).
    if allow_null && !in_check && depth >= 3 && !is_pawn_endgame(ctx.board) {
        ctx.board.do_null_move();
        let score = -pvs(
            ctx,
            depth - 1 - NULL_MOVE_REDUCTION,
            ply + 1,
            false,
            -beta,
            -beta + 1,
        );
        ctx.board.undo_null_move();
        if ctx.control.stopped() {
            return 0;
        }
        if score >= beta {
            return score;
        }
    }

    let moves = generate_moves(ctx.board);
    if moves.is_empty() {
        return if in_check {
            -(MATE_SCORE - ply as i32)
        } else {
            0
        };
    }

    let mut queue = MovePriorityQueue::from_moves(ctx.board, &moves, hash_move);
    let mut best_score = -INF;
    let mut best_move = Move::NULL;
    let mut bound = Bound::Upper;
    let mut searched = 0u32;

    while let Some(mv) = queue.pop_max() {
        searched += 1;
        let is_tactical = ctx.board.piece_on(mv.dest()).is_some()
            || mv.kind() == MoveKind::Promotion
            || mv.kind() == MoveKind::EnPassant;

        ctx.board.do_move(mv);

        let score = if searched == 1 {
            // The first move carries the full window: with good ordering
            // it is the principal variation.
            -pvs(ctx, depth - 1, ply + 1, true, -beta, -alpha)
        } else {
            // Late move reduction: quiet, non-checking moves that sort
            // this late rarely matter, so look one ply less deep.
            let mut reduction = 0;
            if searched >= 4 && depth >= 3 && !is_tactical && !ctx.board.in_check() {
                reduction = 1;
            }

            // Prove the rest inferior with a null window; a reduced or
            // null-window surprise inside the window forces a re-search.
            let mut score = -pvs(ctx, depth - 1 - reduction, ply + 1, true, -alpha - 1, -alpha);
            if score > alpha && score < beta {
                score = -pvs(ctx, depth - 1, ply + 1, true, -beta, -alpha);
            }
            score
        };

        ctx.board.undo_move(mv);

        if ctx.control.stopped() {
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
        }
        if best_score > alpha {
            alpha = best_score;
            bound = Bound::Exact;
        }
        if alpha >= beta {
            if !queue.is_empty() {
                bound = Bound::Lower;
            }
            break;
        }
    }

    // Never cache results tainted by an abort.
    if !ctx.control.stopped() {
        ctx.tt
            .store(ctx.board.hash(), best_move, depth, best_score, bound, ply as u8);
    }

    best_score
}

/// Quiescence search: resolve captures and promotions until the position
/// is quiet, using the standing evaluation as a fail-soft floor.
pub(crate) fn quiesce(
    ctx: &mut SearchContext<'_>,
    base_ply: usize,
    qply: usize,
    mut alpha: i32,
    beta: i32,
) -> i32 {
    ctx.nodes += 1;
    ctx.seldepth = ctx.seldepth.max(base_ply + qply);

    if base_ply + qply >= MAX_PLY {
        return evaluate(ctx.board);
    }
    if ctx.control.should_stop(ctx.nodes) {
        return 0;
    }

    // In check near the quiescence root the position is anything but
    // quiet: no stand-pat cutoff, and every evasion gets searched.
    let checked_near_root = qply <= 2 && ctx.board.in_check();

    let stand_pat = evaluate(ctx.board);
    let mut best_score = stand_pat;
    if !checked_near_root && stand_pat >= beta {
        return stand_pat;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let moves = if checked_near_root {
        generate_moves(ctx.board)
    } else {
        generate_captures(ctx.board)
    };

    let mut queue = MovePriorityQueue::from_moves(ctx.board, &moves, Move::NULL);
    while let Some(mv) = queue.pop_max() {
        let is_capture =
            ctx.board.piece_on(mv.dest()).is_some() || mv.kind() == MoveKind::EnPassant;

        if is_capture {
            // A capture that loses the exchange outright is not worth
            // resolving.
            let see_score = see(ctx.board, mv);
            if see_score < 0 {
                continue;
            }
            // Delta pruning: even the optimistic outcome plus a safety
            // margin cannot raise alpha.
            if best_score + see_score + DELTA_MARGIN < alpha {
                continue;
            }
        }

        ctx.board.do_move(mv);
        let score = -quiesce(ctx, base_ply, qply + 1, -beta, -alpha);
        ctx.board.undo_move(mv);

        if ctx.control.stopped() {
            return 0;
        }

        if score > best_score {
            best_score = score;
        }
        if best_score > alpha {
            alpha = best_score;
        }
        if alpha >= beta {
            break;
        }
    }

    best_score
}

#[cfg(test)]
mod tests {
    use super::is_pawn_endgame;
    use lucena_core::Board;

    #[test]
    fn pawn_endgame_detection() {
        let kp: Board = "4k3/pppp4/8/8/8/8/PPPP4/4K3 w - - 0 1".parse().unwrap();
        assert!(is_pawn_endgame(&kp));

        let with_rook: Board = "4k3/pppp4/8/8/8/8/PPPP4/R3K3 w - - 0 1".parse().unwrap();
        assert!(!is_pawn_endgame(&with_rook));

        let bare_kings: Board = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert!(is_pawn_endgame(&bare_kings));
    }
}
