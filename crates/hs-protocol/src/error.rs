use std::fmt::Write as _;
use std::time::Duration;

use crate::process::ProcessSnapshot;
use crate::types::Priority;

/// Errors of the election layer.
///
/// Protocol-level variants (`ProtocolViolation`, codec errors) stay inside
/// the process that hit them. Ring-level variants (`Stalled`,
/// `MessageBoundExceeded`, `NoUniqueLeader`) are what `RingNetwork` surfaces
/// to its caller, with a dump of every process.
#[derive(Debug, thiserror::Error)]
pub enum ElectionError {
    #[error("transport error: {0}")]
    Transport(#[from] hs_transport::TransportError),

    #[error("protocol violation: {reason}")]
    ProtocolViolation { reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("duplicate priority {priority} at processes {first} and {second}")]
    DuplicatePriority {
        priority: Priority,
        first: usize,
        second: usize,
    },

    #[error("a ring needs at least one process")]
    EmptyRing,

    #[error("election already started")]
    AlreadyStarted,

    #[error("election stalled after {elapsed:?}\n{}", dump(.snapshots))]
    Stalled {
        elapsed: Duration,
        snapshots: Vec<ProcessSnapshot>,
    },

    #[error("election exceeded its message bound ({sent} > {bound})\n{}", dump(.snapshots))]
    MessageBoundExceeded {
        sent: u64,
        bound: u64,
        snapshots: Vec<ProcessSnapshot>,
    },

    #[error("election finished without a unique leader\n{}", dump(.snapshots))]
    NoUniqueLeader { snapshots: Vec<ProcessSnapshot> },

    #[error("process task failed: {0}")]
    TaskFailed(String),
}

impl From<rmp_serde::encode::Error> for ElectionError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        ElectionError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for ElectionError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        ElectionError::Deserialization(e.to_string())
    }
}

/// One line per process: id, priority, role, phase, known leader.
pub fn dump(snapshots: &[ProcessSnapshot]) -> String {
    let mut out = String::new();
    for snapshot in snapshots {
        let leader = snapshot
            .leader
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "  {} priority={} role={} phase={} leader={}",
            snapshot.id, snapshot.priority, snapshot.role, snapshot.phase, leader
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProcessId, ProcessRole};

    #[test]
    fn test_display_protocol_violation() {
        let err = ElectionError::ProtocolViolation {
            reason: "probe with zero hops remaining".into(),
        };
        assert_eq!(
            err.to_string(),
            "protocol violation: probe with zero hops remaining"
        );
    }

    #[test]
    fn test_display_duplicate_priority() {
        let err = ElectionError::DuplicatePriority {
            priority: Priority(5),
            first: 0,
            second: 1,
        };
        assert_eq!(
            err.to_string(),
            "duplicate priority 5 at processes 0 and 1"
        );
    }

    #[test]
    fn test_display_stalled_dumps_every_process() {
        let snapshots = vec![
            ProcessSnapshot {
                id: ProcessId::new(0),
                priority: Priority(5),
                role: ProcessRole::Active,
                phase: 1,
                leader: None,
                finished: false,
            },
            ProcessSnapshot {
                id: ProcessId::new(1),
                priority: Priority(9),
                role: ProcessRole::Leader,
                phase: 2,
                leader: Some(ProcessId::new(1)),
                finished: false,
            },
        ];
        let err = ElectionError::Stalled {
            elapsed: Duration::from_secs(1),
            snapshots,
        };
        let text = err.to_string();
        assert!(text.starts_with("election stalled after 1s"));
        assert!(text.contains("P0 priority=5 role=ACTIVE phase=1 leader=-"));
        assert!(text.contains("P1 priority=9 role=LEADER phase=2 leader=P1"));
    }
}
