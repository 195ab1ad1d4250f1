use std::cmp::{Ordering, Reverse};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use hs_transport::{Direction, ProcessId};

/// Election priority of a process. Higher wins. Fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub u64);

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Priority {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Election round. Probe distance in phase `k` is `2^k` hops.
pub type Phase = u32;

/// Role of a process in the election.
///
/// Follows the progression: Active -> Defeated, or Active -> Leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessRole {
    /// Still originating probes.
    Active,
    /// Lost; only relays traffic from now on.
    Defeated,
    /// Won the election. Terminal.
    Leader,
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessRole::Active => write!(f, "ACTIVE"),
            ProcessRole::Defeated => write!(f, "DEFEATED"),
            ProcessRole::Leader => write!(f, "LEADER"),
        }
    }
}

/// Total order used to compare candidates.
///
/// Priority first; on equal priority the lower `ProcessId` ranks higher, so
/// duplicate priorities still produce exactly one, reproducible winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub priority: Priority,
    pub id: ProcessId,
}

impl Rank {
    pub fn new(id: ProcessId, priority: Priority) -> Self {
        Self { priority, id }
    }

    fn key(&self) -> (Priority, Reverse<ProcessId>) {
        (self.priority, Reverse(self.id))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Hops a probe travels in `phase` (`2^phase`, saturating).
pub fn probe_distance(phase: Phase) -> u64 {
    1u64.checked_shl(phase).unwrap_or(u64::MAX)
}

/// Whether a probe issued in `phase` would span the whole ring.
///
/// A process that reaches such a phase has beaten every other process.
pub fn spans_ring(phase: Phase, ring_size: usize) -> bool {
    probe_distance(phase) >= ring_size as u64
}

/// Upper bound on messages for one election on a ring of `ring_size`.
///
/// Phase 0 costs at most `4N`; every later phase at most `8N` because
/// survivors of phase `k - 1` are more than `2^(k-1)` hops apart. Plus `N`
/// hops of ELECTED.
pub fn message_bound(ring_size: usize) -> u64 {
    let n = ring_size as u64;
    let phases = ceil_log2(n) + 1;
    8 * n * phases + n
}

fn ceil_log2(n: u64) -> u64 {
    if n <= 1 {
        0
    } else {
        u64::from(64 - (n - 1).leading_zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_orders_by_priority_then_lowest_id() {
        let low = Rank::new(ProcessId::new(0), Priority(5));
        let high = Rank::new(ProcessId::new(3), Priority(7));
        assert!(high > low);

        let tie_first = Rank::new(ProcessId::new(0), Priority(5));
        let tie_second = Rank::new(ProcessId::new(1), Priority(5));
        assert!(tie_first > tie_second);
    }

    #[test]
    fn probe_distance_doubles() {
        assert_eq!(probe_distance(0), 1);
        assert_eq!(probe_distance(1), 2);
        assert_eq!(probe_distance(5), 32);
        assert_eq!(probe_distance(200), u64::MAX);
    }

    #[test]
    fn spans_ring_thresholds() {
        assert!(spans_ring(0, 1));
        assert!(!spans_ring(0, 2));
        assert!(spans_ring(1, 2));
        assert!(!spans_ring(1, 4) && spans_ring(2, 4));
        assert!(!spans_ring(1, 3) && spans_ring(2, 3));
    }

    #[test]
    fn ceil_log2_values() {
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(4), 2);
        assert_eq!(ceil_log2(5), 3);
        assert_eq!(ceil_log2(1024), 10);
    }

    #[test]
    fn message_bound_grows_n_log_n() {
        assert_eq!(message_bound(1), 9);
        assert_eq!(message_bound(2), 34);
        assert_eq!(message_bound(4), 4 * 8 * 3 + 4);
    }

    #[test]
    fn role_display_is_upper_case() {
        assert_eq!(ProcessRole::Leader.to_string(), "LEADER");
        assert_eq!(ProcessRole::Defeated.to_string(), "DEFEATED");
    }
}
