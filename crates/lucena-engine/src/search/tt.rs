//! Transposition table: two-slot buckets with a depth-aware
//! replacement policy.
//!
//! Each bucket holds an "always replace" slot, overwritten by every
//! store, and a "keep the deeper" slot, overwritten only when the new
//! entry searched at least as deep as the resident. Retrieval prefers
//! the deep slot. Bucket indices come from a Fibonacci multiplicative
//! hash of the Zobrist key; collisions within a bucket are simply
//! accepted — with 64-bit keys a false match is astronomically unlikely.

use lucena_core::Move;

use crate::search::pvs::MATE_THRESHOLD;

/// 2^64 / phi, the Fibonacci hashing multiplier.
const FIBONACCI_MULTIPLIER: u64 = 0x9e37_79b9_7f4a_7c15;

/// How a stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is the exact search value.
    Exact,
    /// The search failed high; the true value is at least this score.
    Lower,
    /// The search failed low; the true value is at most this score.
    Upper,
}

/// One cached search result.
#[derive(Debug, Clone, Copy)]
struct Entry {
    key: u64,
    best_move: Move,
    depth: u8,
    score: i32,
    bound: Bound,
}

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    always: Option<Entry>,
    deep: Option<Entry>,
}

/// A successful probe.
#[derive(Debug, Clone, Copy)]
pub struct TtHit {
    pub best_move: Move,
    pub depth: u8,
    pub score: i32,
    pub bound: Bound,
}

/// Convert a score to its stored form: mate scores become distance from
/// *this node* rather than from the root, so they stay valid when the
/// position is reached along a different path.
fn score_to_tt(score: i32, ply: u8) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply as i32
    } else if score < -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

/// Undo [`score_to_tt`] for the probing node's ply.
fn score_from_tt(score: i32, ply: u8) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply as i32
    } else if score < -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

/// Fixed-size open-addressed cache of search results, keyed by position
/// hash. Owned exclusively by one search at a time.
pub struct TranspositionTable {
    buckets: Box<[Bucket]>,
    bits: u32,
}

impl TranspositionTable {
    /// Allocate a table of at most `bytes` bytes, rounded down to a
    /// power-of-two bucket count.
    ///
    /// # Panics
    ///
    /// Panics if the budget is below one bucket — a build-configuration
    /// mistake, not a runtime condition.
    pub fn new(bytes: usize) -> TranspositionTable {
        let bucket_bytes = std::mem::size_of::<Bucket>();
        let count = bytes / bucket_bytes;
        assert!(count >= 1, "transposition table smaller than one bucket");

        let count = if count.is_power_of_two() {
            count
        } else {
            count.next_power_of_two() >> 1
        };

        TranspositionTable {
            buckets: vec![Bucket::default(); count].into_boxed_slice(),
            bits: count.trailing_zeros(),
        }
    }

    /// Convenience constructor sized in megabytes.
    pub fn with_megabytes(mb: usize) -> TranspositionTable {
        TranspositionTable::new(mb * 1024 * 1024)
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        (hash.wrapping_mul(FIBONACCI_MULTIPLIER) >> (64 - self.bits)) as usize
    }

    /// Cache a search result for the position `hash`.
    pub fn store(&mut self, hash: u64, best_move: Move, depth: u8, score: i32, bound: Bound, ply: u8) {
        let entry = Entry {
            key: hash,
            best_move,
            depth,
            score: score_to_tt(score, ply),
            bound,
        };
        let bucket = &mut self.buckets[self.bucket_index(hash)];

        bucket.always = Some(entry);
        if bucket.deep.is_none_or(|resident| depth >= resident.depth) {
            bucket.deep = Some(entry);
        }
    }

    /// Look up the position `hash`, preferring the depth-preserving slot.
    pub fn probe(&self, hash: u64, ply: u8) -> Option<TtHit> {
        let bucket = &self.buckets[self.bucket_index(hash)];

        let entry = match (bucket.deep, bucket.always) {
            (Some(deep), _) if deep.key == hash => deep,
            (_, Some(always)) if always.key == hash => always,
            _ => return None,
        };

        Some(TtHit {
            best_move: entry.best_move,
            depth: entry.depth,
            score: score_from_tt(entry.score, ply),
            bound: entry.bound,
        })
    }

    /// Drop every entry, keeping the allocation. Call between games.
    pub fn clear(&mut self) {
        self.buckets.fill(Bucket::default());
    }

    /// Sampled occupancy in per mille, for progress reporting.
    pub fn permille_full(&self) -> u32 {
        let sample = self.buckets.len().min(1000);
        let mut used = 0u32;
        for bucket in &self.buckets[..sample] {
            used += bucket.always.is_some() as u32;
            used += bucket.deep.is_some() as u32;
        }
        used * 1000 / (sample as u32 * 2)
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("buckets", &self.buckets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucena_core::Square;

    fn mv(from: Square, to: Square) -> Move {
        Move::new(from, to)
    }

    #[test]
    fn bucket_count_rounds_down_to_power_of_two() {
        let tt = TranspositionTable::new(100 * std::mem::size_of::<Bucket>());
        assert_eq!(tt.buckets.len(), 64);
    }

    #[test]
    #[should_panic(expected = "smaller than one bucket")]
    fn sub_bucket_budget_is_fatal() {
        let _ = TranspositionTable::new(1);
    }

    #[test]
    fn store_then_probe_roundtrip() {
        let mut tt = TranspositionTable::with_megabytes(1);
        let hash = 0xdead_beef_1234_5678;
        tt.store(hash, mv(Square::E2, Square::E4), 5, 100, Bound::Exact, 0);

        let hit = tt.probe(hash, 0).expect("stored entry found");
        assert_eq!(hit.best_move, mv(Square::E2, Square::E4));
        assert_eq!(hit.depth, 5);
        assert_eq!(hit.score, 100);
        assert_eq!(hit.bound, Bound::Exact);

        assert!(tt.probe(hash ^ 1, 0).is_none(), "different key misses");
    }

    #[test]
    fn shallower_store_keeps_deeper_entry_retrievable() {
        // The sequence from the reference suite: d5, then d4, then d6.
        let mut tt = TranspositionTable::with_megabytes(1);
        let hash = 0x1111_2222_3333_4444;
        let first = mv(Square::A2, Square::A3);
        let second = mv(Square::B2, Square::B3);
        let third = mv(Square::C2, Square::C3);

        tt.store(hash, first, 5, 100, Bound::Exact, 0);
        tt.store(hash, second, 4, 200, Bound::Lower, 0);
        // The depth-preserving slot still has the d5 entry.
        let hit = tt.probe(hash, 0).unwrap();
        assert_eq!(hit.best_move, first);
        assert_eq!(hit.depth, 5);

        tt.store(hash, third, 6, 300, Bound::Upper, 0);
        let hit = tt.probe(hash, 0).unwrap();
        assert_eq!(hit.best_move, third);
        assert_eq!(hit.depth, 6);
        assert_eq!(hit.bound, Bound::Upper);
    }

    #[test]
    fn always_slot_tracks_most_recent_store() {
        let mut tt = TranspositionTable::with_megabytes(1);
        let hash = 0xaaaa_bbbb_cccc_dddd;
        tt.store(hash, mv(Square::A2, Square::A3), 9, 50, Bound::Exact, 0);
        tt.store(hash, mv(Square::B2, Square::B3), 1, 60, Bound::Exact, 0);

        let bucket = &tt.buckets[tt.bucket_index(hash)];
        assert_eq!(bucket.always.unwrap().best_move, mv(Square::B2, Square::B3));
        assert_eq!(bucket.deep.unwrap().best_move, mv(Square::A2, Square::A3));
    }

    #[test]
    fn equal_depth_refreshes_deep_slot() {
        let mut tt = TranspositionTable::with_megabytes(1);
        let hash = 0x5555_6666_7777_8888;
        tt.store(hash, mv(Square::A2, Square::A3), 4, 10, Bound::Exact, 0);
        tt.store(hash, mv(Square::B2, Square::B3), 4, 20, Bound::Exact, 0);
        let hit = tt.probe(hash, 0).unwrap();
        assert_eq!(hit.best_move, mv(Square::B2, Square::B3));
        assert_eq!(hit.score, 20);
    }

    #[test]
    fn clear_empties_the_table() {
        let mut tt = TranspositionTable::with_megabytes(1);
        let hash = 0x0123_4567_89ab_cdef;
        tt.store(hash, mv(Square::E2, Square::E4), 3, 42, Bound::Exact, 0);
        assert!(tt.probe(hash, 0).is_some());
        tt.clear();
        assert!(tt.probe(hash, 0).is_none());
        assert_eq!(tt.permille_full(), 0);
    }

    #[test]
    fn permille_grows_with_stores() {
        let mut tt = TranspositionTable::new(64 * std::mem::size_of::<Bucket>());
        assert_eq!(tt.permille_full(), 0);
        for i in 0..1000u64 {
            tt.store(
                i.wrapping_mul(0x2545_f491_4f6c_dd1d),
                mv(Square::E2, Square::E4),
                1,
                0,
                Bound::Exact,
                0,
            );
        }
        assert!(tt.permille_full() > 500);
    }

    #[test]
    fn mate_scores_stay_path_independent() {
        use crate::search::pvs::MATE_SCORE;

        let mut tt = TranspositionTable::with_megabytes(1);
        let hash = 0x1357_9bdf_0246_8ace;
        // A mate found 3 plies below a node at ply 5.
        let score_at_store = MATE_SCORE - 8;
        tt.store(hash, mv(Square::E2, Square::E4), 4, score_at_store, Bound::Exact, 5);

        // Probing from ply 2 must report the mate as seen from ply 2.
        let hit = tt.probe(hash, 2).unwrap();
        assert_eq!(hit.score, MATE_SCORE - 5);
    }
}
