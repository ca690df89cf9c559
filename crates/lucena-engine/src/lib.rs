//! Search and evaluation for the lucena chess engine.

pub mod eval;
pub mod search;

pub use eval::{evaluate, piece_value};
pub use search::control::{SearchControl, SearchLimits};
pub use search::pq::MovePriorityQueue;
pub use search::see::see;
pub use search::tt::{Bound, TranspositionTable, TtHit};
pub use search::{
    INF, MATE_SCORE, MATE_THRESHOLD, MAX_PLY, SearchReport, format_score, principal_variation,
    search, search_with_progress,
};
