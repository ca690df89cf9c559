//! Cooperative search budgets: depth, nodes, wall clock, external stop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Only sample the wall clock when `nodes & MASK == 0`; a syscall per
/// node would dominate the search.
const CLOCK_CHECK_MASK: u64 = 2047;

/// Caller-supplied budget for one search invocation. Limits compose:
/// the first one exhausted stops the search.
#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Maximum iterative-deepening depth.
    pub max_depth: u8,
    /// Maximum nodes to visit (search and quiescence combined).
    pub max_nodes: u64,
    /// Wall-clock budget; `None` runs until another limit or the stop
    /// flag ends the search.
    pub max_time: Option<Duration>,
}

impl SearchLimits {
    /// Search to a fixed depth with no other limits.
    pub fn depth(depth: u8) -> SearchLimits {
        SearchLimits {
            max_depth: depth,
            ..SearchLimits::default()
        }
    }

    /// Search until the clock runs out.
    pub fn move_time(time: Duration) -> SearchLimits {
        SearchLimits {
            max_time: Some(time),
            ..SearchLimits::default()
        }
    }

    /// Search until the caller sets the stop flag.
    pub fn infinite() -> SearchLimits {
        SearchLimits::default()
    }
}

impl Default for SearchLimits {
    fn default() -> SearchLimits {
        SearchLimits {
            max_depth: u8::MAX,
            max_nodes: u64::MAX,
            max_time: None,
        }
    }
}

/// Live budget tracking for a running search.
///
/// The stop flag is shared with the caller, who may set it from another
/// thread at any time; the search observes it within a bounded number of
/// nodes. Once any limit trips, the flag latches so every active stack
/// frame unwinds on its next check.
pub struct SearchControl {
    stop: Arc<AtomicBool>,
    start: Instant,
    max_nodes: u64,
    deadline: Option<Duration>,
}

impl SearchControl {
    pub fn new(limits: &SearchLimits, stop: Arc<AtomicBool>) -> SearchControl {
        SearchControl {
            stop,
            start: Instant::now(),
            max_nodes: limits.max_nodes,
            deadline: limits.max_time,
        }
    }

    /// The cooperative cancellation point, called once per node.
    ///
    /// The stop flag and node budget are checked every time; the clock
    /// only on the sampling cadence.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }

        if nodes >= self.max_nodes {
            self.stop.store(true, Ordering::Relaxed);
            return true;
        }

        if nodes & CLOCK_CHECK_MASK != 0 {
            return false;
        }

        if let Some(deadline) = self.deadline
            && self.start.elapsed() >= deadline
        {
            self.stop.store(true, Ordering::Relaxed);
            return true;
        }

        false
    }

    /// Has the search been stopped (without advancing any budget)?
    #[inline]
    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn infinite_limits_never_stop_on_their_own() {
        let control = SearchControl::new(&SearchLimits::infinite(), flag());
        for nodes in [0, 1, 2048, 1 << 20] {
            assert!(!control.should_stop(nodes));
        }
    }

    #[test]
    fn external_stop_flag_is_seen_immediately() {
        let stop = flag();
        let control = SearchControl::new(&SearchLimits::infinite(), Arc::clone(&stop));
        assert!(!control.should_stop(1));
        stop.store(true, Ordering::Relaxed);
        assert!(control.should_stop(1));
        assert!(control.stopped());
    }

    #[test]
    fn node_budget_latches_the_stop_flag() {
        let stop = flag();
        let limits = SearchLimits {
            max_nodes: 100,
            ..SearchLimits::default()
        };
        let control = SearchControl::new(&limits, Arc::clone(&stop));
        assert!(!control.should_stop(99));
        assert!(control.should_stop(100));
        assert!(stop.load(Ordering::Relaxed), "flag latched");
        assert!(control.should_stop(1), "latched flag stops everything");
    }

    #[test]
    fn expired_clock_stops_on_sampling_cadence() {
        let limits = SearchLimits::move_time(Duration::ZERO);
        let control = SearchControl::new(&limits, flag());
        // Off-cadence node counts skip the clock.
        assert!(!control.should_stop(1));
        // On-cadence the expired deadline is noticed and latched.
        assert!(control.should_stop(2048));
        assert!(control.should_stop(3));
    }
}
