//! Ring assembly and supervision.
//!
//! `RingNetwork` wires N processes into a bidirectional ring, runs each on
//! its own task, and watches them until exactly one leader is known to all.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hs_transport::{wire_ring, RingPort};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

use crate::config::RingConfig;
use crate::error::ElectionError;
use crate::metrics::{MessageCounters, MessageStats};
use crate::process::{ElectionProcess, EventSink, ProcessSnapshot, TraceRecord};
use crate::types::{message_bound, Phase, Priority, ProcessId, ProcessRole};

/// Result of a completed election.
#[derive(Debug, Clone)]
pub struct ElectionOutcome {
    pub leader: ProcessId,
    pub leader_priority: Priority,
    /// Phase in which the leader declared itself.
    pub phase: Phase,
    pub stats: MessageStats,
    /// `message_bound(N)` for this ring.
    pub bound: u64,
    /// Final state of every process, by ring position.
    pub snapshots: Vec<ProcessSnapshot>,
    /// Every process event, if trace recording was enabled.
    pub trace: Vec<TraceRecord>,
    pub elapsed: Duration,
}

/// A ring of election processes.
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), hs_protocol::ElectionError> {
/// use hs_protocol::{Priority, RingNetwork};
///
/// let priorities = [5, 9, 2, 7].map(Priority);
/// let mut ring = RingNetwork::create_ring(&priorities)?;
/// let outcome = ring.run_until_elected().await?;
/// assert_eq!(outcome.leader.index(), 1);
/// # Ok(())
/// # }
/// ```
pub struct RingNetwork {
    config: RingConfig,
    /// Processes not yet started; `None` once the election ran.
    pending: Option<Vec<ElectionProcess<RingPort>>>,
    snapshots: Vec<watch::Receiver<ProcessSnapshot>>,
    counters: Arc<MessageCounters>,
    trace_rx: Option<mpsc::UnboundedReceiver<TraceRecord>>,
    shutdown_tx: watch::Sender<bool>,
}

impl RingNetwork {
    /// Build a ring with default configuration. `priorities[i]` belongs to
    /// the process at position `i`.
    pub fn create_ring(priorities: &[Priority]) -> Result<Self, ElectionError> {
        Self::with_config(priorities, RingConfig::new())
    }

    pub fn with_config(priorities: &[Priority], config: RingConfig) -> Result<Self, ElectionError> {
        if priorities.is_empty() {
            return Err(ElectionError::EmptyRing);
        }
        check_priorities(priorities, config.strict_priorities)?;

        let ports = wire_ring(priorities.len(), &config.link)?;
        let counters = Arc::new(MessageCounters::new());
        let (trace_tx, trace_rx) = if config.record_trace {
            let (tx, rx) = mpsc::unbounded_channel();
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };
        let sink = EventSink::new(counters.clone(), trace_tx, Instant::now());

        let mut pending = Vec::with_capacity(ports.len());
        let mut snapshots = Vec::with_capacity(ports.len());
        for (port, priority) in ports.into_iter().zip(priorities) {
            let (process, snapshot_rx) = ElectionProcess::new(port, *priority, sink.clone());
            pending.push(process);
            snapshots.push(snapshot_rx);
        }

        let (shutdown_tx, _) = watch::channel(false);
        tracing::debug!(ring_size = priorities.len(), "ring wired");

        Ok(Self {
            config,
            pending: Some(pending),
            snapshots,
            counters,
            trace_rx,
            shutdown_tx,
        })
    }

    pub fn ring_size(&self) -> usize {
        self.snapshots.len()
    }

    /// Latest published state of one process.
    pub fn snapshot(&self, id: ProcessId) -> Option<ProcessSnapshot> {
        self.snapshots.get(id.index()).map(|rx| rx.borrow().clone())
    }

    /// Latest published state of every process, by ring position.
    pub fn snapshots(&self) -> Vec<ProcessSnapshot> {
        self.snapshots.iter().map(|rx| rx.borrow().clone()).collect()
    }

    /// Watch one process. Updates arrive after every event it handles.
    pub fn subscribe(&self, id: ProcessId) -> Option<watch::Receiver<ProcessSnapshot>> {
        self.snapshots.get(id.index()).cloned()
    }

    pub fn stats(&self) -> MessageStats {
        self.counters.stats()
    }

    /// Start every process and wait for the election to complete.
    ///
    /// Fails with `Stalled` after the configured timeout, with
    /// `MessageBoundExceeded` as soon as the message count passes
    /// `message_bound(N)` (when enforced), and with `NoUniqueLeader` if the
    /// processes finish without agreeing. Can only be called once.
    pub async fn run_until_elected(&mut self) -> Result<ElectionOutcome, ElectionError> {
        let processes = self.pending.take().ok_or(ElectionError::AlreadyStarted)?;
        let ring_size = processes.len();
        let bound = message_bound(ring_size);
        let started = Instant::now();

        tracing::info!(ring_size, bound, "election started");

        let mut tasks = JoinSet::new();
        for process in processes {
            tasks.spawn(process.run(self.shutdown_tx.subscribe()));
        }

        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);
        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.tick().await;

        loop {
            tokio::select! {
                joined = tasks.join_next() => {
                    match joined {
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            self.stop(&mut tasks).await;
                            return Err(ElectionError::TaskFailed(e.to_string()));
                        }
                        None => break,
                    }
                }

                _ = &mut deadline => {
                    self.stop(&mut tasks).await;
                    let snapshots = self.snapshots();
                    tracing::warn!(elapsed = ?started.elapsed(), "election stalled");
                    return Err(ElectionError::Stalled {
                        elapsed: started.elapsed(),
                        snapshots,
                    });
                }

                _ = poll.tick() => {
                    if let Err(e) = self.check_bound(bound) {
                        self.stop(&mut tasks).await;
                        return Err(e);
                    }
                }
            }
        }

        self.check_bound(bound)?;
        let snapshots = self.snapshots();
        let leader = unique_leader(&snapshots).ok_or_else(|| ElectionError::NoUniqueLeader {
            snapshots: snapshots.clone(),
        })?;

        let trace = match self.trace_rx.as_mut() {
            Some(rx) => {
                let mut records = Vec::new();
                while let Ok(record) = rx.try_recv() {
                    records.push(record);
                }
                records
            }
            None => Vec::new(),
        };

        let outcome = ElectionOutcome {
            leader: leader.id,
            leader_priority: leader.priority,
            phase: leader.phase,
            stats: self.counters.stats(),
            bound,
            snapshots,
            trace,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            leader = %outcome.leader,
            priority = %outcome.leader_priority,
            phase = outcome.phase,
            messages = outcome.stats.total(),
            bound,
            "election complete"
        );
        Ok(outcome)
    }

    fn check_bound(&self, bound: u64) -> Result<(), ElectionError> {
        let sent = self.counters.total();
        if self.config.enforce_message_bound && sent > bound {
            tracing::warn!(sent, bound, "message bound exceeded");
            return Err(ElectionError::MessageBoundExceeded {
                sent,
                bound,
                snapshots: self.snapshots(),
            });
        }
        Ok(())
    }

    /// Signal shutdown and wait for every task to return.
    async fn stop(&self, tasks: &mut JoinSet<ProcessSnapshot>) {
        self.shutdown_tx.send_replace(true);
        while tasks.join_next().await.is_some() {}
    }
}

/// Enforce or warn about equal priorities.
fn check_priorities(priorities: &[Priority], strict: bool) -> Result<(), ElectionError> {
    let mut seen: HashMap<Priority, usize> = HashMap::with_capacity(priorities.len());
    for (index, priority) in priorities.iter().enumerate() {
        if let Some(&first) = seen.get(priority) {
            if strict {
                return Err(ElectionError::DuplicatePriority {
                    priority: *priority,
                    first,
                    second: index,
                });
            }
            tracing::warn!(
                %priority,
                first,
                second = index,
                "duplicate priority, lower position wins the tie"
            );
        } else {
            seen.insert(*priority, index);
        }
    }
    Ok(())
}

/// The leader, if exactly one process is LEADER and everyone finished
/// agreeing on it.
fn unique_leader(snapshots: &[ProcessSnapshot]) -> Option<&ProcessSnapshot> {
    let mut leaders = snapshots
        .iter()
        .filter(|snapshot| snapshot.role == ProcessRole::Leader);
    let leader = leaders.next()?;
    if leaders.next().is_some() {
        return None;
    }
    snapshots
        .iter()
        .all(|snapshot| snapshot.finished && snapshot.leader == Some(leader.id))
        .then_some(leader)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(index: usize, role: ProcessRole, leader: Option<usize>) -> ProcessSnapshot {
        ProcessSnapshot {
            id: ProcessId::new(index),
            priority: Priority(index as u64),
            role,
            phase: 0,
            leader: leader.map(ProcessId::new),
            finished: true,
        }
    }

    #[test]
    fn empty_ring_is_rejected() {
        assert!(matches!(
            RingNetwork::create_ring(&[]),
            Err(ElectionError::EmptyRing)
        ));
    }

    #[test]
    fn strict_mode_rejects_duplicate_priorities() {
        let priorities = [5, 9, 5].map(Priority);
        let err = RingNetwork::with_config(&priorities, RingConfig::new().strict_priorities(true))
            .err()
            .expect("duplicates must be rejected");
        assert!(matches!(
            err,
            ElectionError::DuplicatePriority {
                first: 0,
                second: 2,
                ..
            }
        ));
        assert!(check_priorities(&priorities, false).is_ok());
    }

    #[test]
    fn fresh_ring_is_all_active() {
        let ring = RingNetwork::create_ring(&[3, 1, 2].map(Priority)).unwrap();
        assert_eq!(ring.ring_size(), 3);
        assert!(ring
            .snapshots()
            .iter()
            .all(|s| s.role == ProcessRole::Active && s.phase == 0 && !s.finished));
        assert_eq!(
            ring.snapshot(ProcessId::new(1)).unwrap().priority,
            Priority(1)
        );
        assert!(ring.snapshot(ProcessId::new(3)).is_none());
        assert_eq!(ring.stats().total(), 0);
    }

    #[test]
    fn check_bound_reports_every_process() {
        let ring = RingNetwork::create_ring(&[5, 9, 2].map(Priority)).unwrap();
        let bound = message_bound(3);
        for _ in 0..bound {
            ring.counters.probes.inc();
        }
        assert!(ring.check_bound(bound).is_ok(), "reaching the bound is allowed");

        ring.counters.replies.inc();
        match ring.check_bound(bound) {
            Err(ElectionError::MessageBoundExceeded {
                sent,
                bound: reported,
                snapshots,
            }) => {
                assert_eq!(sent, bound + 1);
                assert_eq!(reported, bound);
                assert_eq!(snapshots.len(), 3);
            }
            other => panic!("expected MessageBoundExceeded, got {other:?}"),
        }
    }

    #[test]
    fn unenforced_bound_never_fails() {
        let ring = RingNetwork::with_config(
            &[5, 9].map(Priority),
            RingConfig::new().enforce_message_bound(false),
        )
        .unwrap();
        ring.counters.probes.inc();
        assert!(ring.check_bound(0).is_ok());
    }

    #[tokio::test]
    async fn run_fails_once_the_bound_is_passed() {
        let mut ring = RingNetwork::with_config(
            &[5, 9, 2, 7].map(Priority),
            RingConfig::new().timeout(Duration::from_secs(10)),
        )
        .unwrap();
        let bound = message_bound(4);
        for _ in 0..=bound {
            ring.counters.probes.inc();
        }

        let err = ring.run_until_elected().await.unwrap_err();
        assert!(
            matches!(
                &err,
                ElectionError::MessageBoundExceeded { sent, snapshots, .. }
                    if *sent > bound && snapshots.len() == 4
            ),
            "got {err}"
        );
        assert!(err.to_string().contains("P1 priority=9"));
    }

    #[test]
    fn unique_leader_requires_agreement() {
        let agreed = vec![
            snapshot(0, ProcessRole::Defeated, Some(1)),
            snapshot(1, ProcessRole::Leader, Some(1)),
        ];
        assert_eq!(unique_leader(&agreed).map(|s| s.id), Some(ProcessId::new(1)));

        let two_leaders = vec![
            snapshot(0, ProcessRole::Leader, Some(0)),
            snapshot(1, ProcessRole::Leader, Some(1)),
        ];
        assert!(unique_leader(&two_leaders).is_none());

        let disagreement = vec![
            snapshot(0, ProcessRole::Defeated, Some(2)),
            snapshot(1, ProcessRole::Leader, Some(1)),
        ];
        assert!(unique_leader(&disagreement).is_none());
    }
}
