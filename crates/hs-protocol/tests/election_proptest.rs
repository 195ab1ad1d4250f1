//! Property tests: any delivery order that keeps links FIFO elects the same,
//! single leader within the message bound.

mod common;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hs_protocol::{message_bound, spans_ring, Phase, ProcessId, ProcessRole};

use common::LockstepRing;

/// Position of the process that must win: highest priority, lowest id on ties.
fn expected_leader(priorities: &[u64]) -> usize {
    priorities
        .iter()
        .enumerate()
        .max_by_key(|(i, p)| (**p, std::cmp::Reverse(*i)))
        .map(|(i, _)| i)
        .unwrap()
}

/// First phase whose probe would span a ring of `n`.
fn final_phase(n: usize) -> Phase {
    (0..).find(|phase| spans_ring(*phase, n)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Unique priorities, random schedule.
    #[test]
    fn random_schedule_elects_maximum(
        priorities in prop::collection::hash_set(1..10_000u64, 1..=40),
        seed in any::<u64>(),
    ) {
        let priorities: Vec<u64> = priorities.into_iter().collect();
        let n = priorities.len();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut ring = LockstepRing::new(&priorities);
        ring.run_with(|ready| rng.random_range(0..ready));

        let leader = ProcessId::new(expected_leader(&priorities));
        let snapshots = ring.snapshots();

        prop_assert_eq!(
            snapshots.iter().filter(|s| s.role == ProcessRole::Leader).count(),
            1
        );
        prop_assert_eq!(snapshots[leader.index()].role, ProcessRole::Leader);
        prop_assert_eq!(snapshots[leader.index()].phase, final_phase(n));
        for snapshot in &snapshots {
            prop_assert!(snapshot.finished, "{} did not finish", snapshot.id);
            prop_assert_eq!(snapshot.leader, Some(leader));
        }
        prop_assert!(
            ring.sent <= message_bound(n),
            "{} messages for N={}, bound {}",
            ring.sent,
            n,
            message_bound(n)
        );
    }

    /// Priorities drawn from a tiny range, so ties are common.
    #[test]
    fn ties_go_to_lowest_position(
        priorities in prop::collection::vec(1..4u64, 1..=30),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ring = LockstepRing::new(&priorities);
        ring.run_with(|ready| rng.random_range(0..ready));

        let leader = ProcessId::new(expected_leader(&priorities));
        let snapshots = ring.snapshots();
        prop_assert_eq!(snapshots[leader.index()].role, ProcessRole::Leader);
        prop_assert!(snapshots
            .iter()
            .all(|s| s.finished && s.leader == Some(leader)));
        prop_assert!(ring.sent <= message_bound(priorities.len()));
    }
}
