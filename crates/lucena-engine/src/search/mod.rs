//! Iterative-deepening search driver.

pub mod control;
pub mod pq;
mod pvs;
pub mod see;
pub mod tt;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tracing::{debug, info};

use lucena_core::{Board, Move, generate_moves};

use control::{SearchControl, SearchLimits};
use pvs::{SearchContext, pvs};
use tt::TranspositionTable;

pub use pvs::{INF, MATE_SCORE, MATE_THRESHOLD, MAX_PLY};

/// Half-pawn window around the previous iteration's score.
const ASPIRATION_WINDOW: i32 = 50;

/// Outcome of a search invocation.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Best move at the deepest completed iteration; `None` only when the
    /// root position is already decided (mate/stalemate) or the search
    /// was stopped before depth 1 produced anything.
    pub best_move: Option<Move>,
    /// Score in centipawns (side to move), or a mate score.
    pub score: i32,
    /// Deepest fully completed iteration.
    pub depth: u8,
    /// Deepest ply reached including extensions and quiescence.
    pub seldepth: usize,
    /// Nodes visited, search and quiescence combined.
    pub nodes: u64,
    /// Principal variation from the root.
    pub pv: Vec<Move>,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl SearchReport {
    fn empty() -> SearchReport {
        SearchReport {
            best_move: None,
            score: 0,
            depth: 0,
            seldepth: 0,
            nodes: 0,
            pv: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Nodes per second. The elapsed time is floored at one millisecond
    /// so a fast search never divides by zero.
    pub fn nps(&self) -> u64 {
        let millis = self.elapsed.as_millis().max(1) as u64;
        self.nodes * 1000 / millis
    }
}

/// Render a score the way a host protocol expects it: centipawns, or
/// moves-to-mate for forced mates.
pub fn format_score(score: i32) -> String {
    if score > MATE_THRESHOLD {
        format!("mate {}", (MATE_SCORE - score + 1) / 2)
    } else if score < -MATE_THRESHOLD {
        format!("mate -{}", (MATE_SCORE + score + 1) / 2)
    } else {
        format!("cp {score}")
    }
}

/// Search `board` within `limits`, reporting the best move and score.
///
/// Synchronous; the caller may set `stop` from another thread and the
/// search will return within a bounded number of nodes.
pub fn search(
    board: &mut Board,
    tt: &mut TranspositionTable,
    limits: &SearchLimits,
    stop: Arc<AtomicBool>,
) -> SearchReport {
    search_with_progress(board, tt, limits, stop, |_| {})
}

/// [`search`], invoking `on_iteration` after every completed depth.
pub fn search_with_progress(
    board: &mut Board,
    tt: &mut TranspositionTable,
    limits: &SearchLimits,
    stop: Arc<AtomicBool>,
    mut on_iteration: impl FnMut(&SearchReport),
) -> SearchReport {
    let control = SearchControl::new(limits, stop);
    let mut ctx = SearchContext {
        board,
        tt,
        control: &control,
        nodes: 0,
        seldepth: 0,
    };

    let mut report = SearchReport::empty();
    let mut alpha = -INF;
    let mut beta = INF;
    let mut depth: u8 = 1;

    while depth <= limits.max_depth && (depth as usize) < MAX_PLY {
        let score = pvs(&mut ctx, depth, 0, true, alpha, beta);

        if control.stopped() {
            // Discard the aborted iteration. If not even depth 1 went
            // through, whatever the table holds for the root is still
            // the best guess.
            if report.best_move.is_none() {
                report.best_move = principal_variation(ctx.tt, ctx.board, 1).first().copied();
            }
            break;
        }

        // Aspiration fallback: a result outside the window is only a
        // bound, so the same depth is re-searched with the window wide
        // open. Never widened incrementally.
        if score <= alpha || score >= beta {
            debug!(depth, score, "aspiration window missed, re-searching full width");
            alpha = -INF;
            beta = INF;
            continue;
        }
        alpha = score - ASPIRATION_WINDOW;
        beta = score + ASPIRATION_WINDOW;

        let pv = principal_variation(ctx.tt, ctx.board, depth as usize);
        report.best_move = pv.first().copied().or(report.best_move);
        report.score = score;
        report.depth = depth;
        report.seldepth = ctx.seldepth;
        report.nodes = ctx.nodes;
        report.pv = pv;
        report.elapsed = control.elapsed();

        let pv_line = report
            .pv
            .iter()
            .map(|mv| mv.to_uci())
            .collect::<Vec<_>>()
            .join(" ");
        info!(
            depth,
            seldepth = report.seldepth,
            score = %format_score(score),
            nodes = report.nodes,
            nps = report.nps(),
            hashfull = ctx.tt.permille_full(),
            pv = %pv_line,
            "iteration complete"
        );
        on_iteration(&report);

        // A forced mate will not improve with more depth.
        if score.abs() > MATE_THRESHOLD {
            break;
        }
        depth += 1;
    }

    report.nodes = ctx.nodes;
    report.seldepth = ctx.seldepth;
    report.elapsed = control.elapsed();
    report
}

/// Rebuild the principal variation by replaying transposition-table best
/// moves on a scratch copy of the position. Read-side only: stored moves
/// are validated against the legal move list before being trusted.
pub fn principal_variation(tt: &TranspositionTable, board: &Board, max_len: usize) -> Vec<Move> {
    let mut scratch = board.clone();
    let mut pv = Vec::new();

    for ply in 0..max_len {
        let Some(hit) = tt.probe(scratch.hash(), ply as u8) else {
            break;
        };
        if hit.best_move.is_null() || !generate_moves(&scratch).contains(hit.best_move) {
            break;
        }
        scratch.do_move(hit.best_move);
        pv.push(hit.best_move);
    }

    pv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    fn run(fen: &str, depth: u8) -> SearchReport {
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
    fn finds_back_rank_mate_in_one() {
        let report = run("6k1/5ppp/8/8/8/8/8/K2R4 w - - 0 1", 3);
        assert_eq!(report.best_move.unwrap().to_uci(), "d1d8");
        assert_eq!(report.score, MATE_SCORE - 1);
    }

    #[test]
    fn finds_scholars_mate() {
        let report = run(
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
            3,
        );
        assert_eq!(report.best_move.unwrap().to_uci(), "h5f7");
        assert!(report.score > MATE_THRESHOLD);
    }

    #[test]
    fn mate_in_two_has_correct_distance() {
        // 1.Qd2 Kb1 2.Qb2# (or 1.Kb3 Kb1 2.Qd1#): mate lands on ply 3.
        let report = run("8/8/8/8/8/2K5/8/k2Q4 w - - 0 1", 6);
        assert_eq!(report.score, MATE_SCORE - 3);
        assert_eq!(format_score(report.score), "mate 2");
    }

    #[test]
    fn stalemate_scores_exactly_zero() {
        let report = run("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1", 4);
        assert_eq!(report.score, 0);
        assert!(report.best_move.is_none());
    }

    #[test]
    fn checkmated_root_reports_mated_score() {
        // Black to move, already mated in the corner.
        let report = run("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1", 3);
        assert!(report.best_move.is_none());
        assert_eq!(report.score, -MATE_SCORE);
        assert!(format_score(report.score).starts_with("mate -"));
    }

    #[test]
    fn iterations_run_every_depth_exactly_once() {
        let mut board = Board::starting_position();
        let mut tt = TranspositionTable::with_megabytes(16);
        let mut depths = Vec::new();
        search_with_progress(
            &mut board,
            &mut tt,
            &SearchLimits::depth(5),
            Arc::new(AtomicBool::new(false)),
            |report| depths.push(report.depth),
        );
        // Aspiration re-searches repeat a depth internally but never
        // complete it twice, and never skip ahead.
        assert_eq!(depths, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn pv_head_matches_best_move() {
        let report = run(lucena_core::STARTING_FEN, 4);
        assert!(!report.pv.is_empty());
        assert_eq!(report.pv[0], report.best_move.unwrap());
        assert!(report.pv.len() >= 2, "pv should extend past the first move");
    }

    #[test]
    fn node_budget_is_respected() {
        let mut board = Board::starting_position();
        let mut tt = TranspositionTable::with_megabytes(1);
        let limits = SearchLimits {
            max_nodes: 500,
            ..SearchLimits::default()
        };
        let report = search(
            &mut board,
            &mut tt,
            &limits,
            Arc::new(AtomicBool::new(false)),
        );
        assert!(
            report.nodes <= 700,
            "search overshot the node budget: {}",
            report.nodes
        );
    }

    #[test]
    fn stop_flag_ends_the_search_quickly() {
        let mut board = Board::starting_position();
        let mut tt = TranspositionTable::with_megabytes(16);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_after_first = Arc::clone(&stop);
        let report = search_with_progress(
            &mut board,
            &mut tt,
            &SearchLimits::infinite(),
            Arc::clone(&stop),
            move |_| stop_after_first.store(true, Ordering::Relaxed),
        );
        assert!(report.depth <= 2, "stopped search ran to depth {}", report.depth);
        assert!(report.best_move.is_some());
    }

    #[test]
    fn immediate_stop_recovers_move_from_warm_table() {
        let mut board = Board::starting_position();
        let mut tt = TranspositionTable::with_megabytes(16);

        // Warm the table with a normal search.
        let warm = search(
            &mut board,
            &mut tt,
            &SearchLimits::depth(3),
            Arc::new(AtomicBool::new(false)),
        );
        let expected = warm.best_move.unwrap();

        // A search stopped before depth 1 finishes falls back to the TT.
        let report = search(
            &mut board,
            &mut tt,
            &SearchLimits::infinite(),
            Arc::new(AtomicBool::new(true)),
        );
        assert_eq!(report.best_move, Some(expected));
        assert_eq!(report.depth, 0, "no iteration completed");
    }

    #[test]
    fn pawn_endgame_still_searches_soundly() {
        // Null move is off in king-and-pawn endgames; the search must
        // still produce a move and see the extra pawn.
        let report = run("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", 6);
        assert!(report.best_move.is_some());
        assert!(report.score > 0);
    }

    #[test]
    fn format_score_centipawns() {
        assert_eq!(format_score(34), "cp 34");
        assert_eq!(format_score(-150), "cp -150");
    }

    #[test]
    fn principal_variation_replays_only_legal_moves() {
        let mut board = Board::starting_position();
        let mut tt = TranspositionTable::with_megabytes(8);
        search(
            &mut board,
            &mut tt,
            &SearchLimits::depth(4),
            Arc::new(AtomicBool::new(false)),
        );
        let pv = principal_variation(&tt, &board, 4);
        // Replay the PV by hand; every move must be legal in sequence.
        let mut scratch = board.clone();
        for mv in &pv {
            assert!(generate_moves(&scratch).contains(*mv), "{mv} not legal in pv");
            scratch.do_move(*mv);
        }
    }
}
